use thiserror::Error;

/// Reasons a dataset could not be loaded.
#[derive(Debug, Error)]
pub enum LoadError {
	#[error("fetch of {url} failed: {message}")]
	Fetch { url: String, message: String },
	#[error("{url} answered with status {status}")]
	Status { url: String, status: u16 },
	#[error("response body of {url} is not text")]
	Body { url: String },
	#[error("malformed CSV: {0}")]
	Csv(#[from] csv::Error),
}

pub type Result<T> = std::result::Result<T, LoadError>;
