//! Common response envelope types.

use serde::Serialize;

/// Standard wrapper for successful responses carrying a payload.
#[derive(Debug, Serialize)]
pub struct DataResponse<T> {
    pub data: T,
}

impl<T> DataResponse<T> {
    pub fn new(data: T) -> Self {
        DataResponse { data }
    }
}
