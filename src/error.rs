use thiserror::Error;

pub type ChartResult<T> = Result<T, ChartError>;

#[derive(Debug, Error)]
pub enum ChartError {
    #[error("invalid configuration: {0}")]
    InvalidConfig(String),

    #[error("invalid data: {0}")]
    InvalidData(String),

    #[error("layout unavailable: width={width}, height={height}")]
    LayoutUnavailable { width: f64, height: f64 },

    #[error("chart is not mounted")]
    NotMounted,

    #[error("chart is already mounted")]
    AlreadyMounted,

    #[error("render backend failure: {0}")]
    RenderBackend(String),
}
