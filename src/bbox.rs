use crate::error::{Result, VoronoiError};

/// Axis-aligned viewport the diagram is clipped and closed against.
///
/// Coordinates follow the screen convention: y grows downward, so `top`
/// is the smaller y and `bottom` the larger one.
#[derive(Clone, Copy, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct BoundingBox {
    pub left: f64,
    pub right: f64,
    pub top: f64,
    pub bottom: f64,
}

impl BoundingBox {
    pub fn new(left: f64, right: f64, top: f64, bottom: f64) -> BoundingBox {
        BoundingBox {
            left,
            right,
            top,
            bottom,
        }
    }

    pub fn width(&self) -> f64 {
        self.right - self.left
    }

    pub fn height(&self) -> f64 {
        self.bottom - self.top
    }

    pub fn mid_x(&self) -> f64 {
        (self.right + self.left) / 2.
    }

    pub fn mid_y(&self) -> f64 {
        (self.bottom + self.top) / 2.
    }

    /// Inclusive containment test.
    pub fn contains(&self, x: f64, y: f64) -> bool {
        !(x < self.left || x > self.right || y < self.top || y > self.bottom)
    }

    pub(crate) fn validate(&self) -> Result<()> {
        let finite = self.left.is_finite()
            && self.right.is_finite()
            && self.top.is_finite()
            && self.bottom.is_finite();
        if !finite || self.left >= self.right || self.top >= self.bottom {
            return Err(VoronoiError::InvalidBoundingBox {
                left: self.left,
                right: self.right,
                top: self.top,
                bottom: self.bottom,
            });
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::BoundingBox;
    use crate::error::VoronoiError;

    #[test]
    fn it_measures() {
        let bbox = BoundingBox::new(-5., 15., -5., 5.);
        assert_eq!(bbox.width(), 20.);
        assert_eq!(bbox.height(), 10.);
        assert_eq!(bbox.mid_x(), 5.);
        assert_eq!(bbox.mid_y(), 0.);
        assert!(bbox.contains(15., 5.));
        assert!(!bbox.contains(15.5, 0.));
    }

    #[test]
    fn it_rejects_malformed_boxes() {
        assert!(BoundingBox::new(0., 10., 0., 10.).validate().is_ok());
        assert!(matches!(
            BoundingBox::new(10., 0., 0., 10.).validate(),
            Err(VoronoiError::InvalidBoundingBox { .. })
        ));
        assert!(BoundingBox::new(0., 10., 5., 5.).validate().is_err());
        assert!(BoundingBox::new(0., f64::INFINITY, 0., 1.).validate().is_err());
        assert!(BoundingBox::new(f64::NAN, 1., 0., 1.).validate().is_err());
    }
}
