/// Error type for diagram computation
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum VoronoiError {
    #[error("invalid bounding box: left={left}, right={right}, top={top}, bottom={bottom}")]
    InvalidBoundingBox {
        left: f64,
        right: f64,
        top: f64,
        bottom: f64,
    },

    #[error("site {index} has a non-finite coordinate ({x}, {y})")]
    NonFiniteSite { index: usize, x: f64, y: f64 },

    // A border walk starting at (x, y) could not reach the next half-edge
    // within the four sides of the box. Only happens when sites lie outside
    // the box or the box is degenerate.
    #[error("cell {cell} cannot be closed against the bounding box from ({x}, {y})")]
    UnclosableCell { cell: usize, x: f64, y: f64 },
}

pub type Result<T> = std::result::Result<T, VoronoiError>;
