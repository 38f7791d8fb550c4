use serde::Serialize;

/// Response envelope shared by every endpoint. `page`/`pages` are part of
/// the wire contract but always 1; pagination is not implemented.
#[derive(Debug, Serialize)]
pub struct ApiResponse<T: Serialize> {
    pub success: bool,
    pub message: String,
    pub data: Option<T>,
    pub total: Option<i64>,
    pub page: i64,
    pub pages: i64,
}

impl<T: Serialize> ApiResponse<T> {
    pub fn ok(message: impl Into<String>, data: T) -> Self {
        Self {
            success: true,
            message: message.into(),
            data: Some(data),
            total: None,
            page: 1,
            pages: 1,
        }
    }

    /// Envelope for list endpoints, with `total` set to the element count.
    pub fn listing(message: impl Into<String>, data: T, total: i64) -> Self {
        Self {
            success: true,
            message: message.into(),
            data: Some(data),
            total: Some(total),
            page: 1,
            pages: 1,
        }
    }
}

impl ApiResponse<()> {
    pub fn message_only(message: impl Into<String>) -> Self {
        Self {
            success: true,
            message: message.into(),
            data: None,
            total: None,
            page: 1,
            pages: 1,
        }
    }
}

#[derive(Debug, Serialize)]
pub struct ErrorBody {
    pub success: bool,
    pub error: String,
    pub details: Option<String>,
}

impl ErrorBody {
    pub fn new(error: impl Into<String>, details: impl Into<String>) -> Self {
        Self {
            success: false,
            error: error.into(),
            details: Some(details.into()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_listing_envelope_shape() {
        let resp = ApiResponse::listing("Found 2 hotels", vec!["a", "b"], 2);
        let json = serde_json::to_value(&resp).unwrap();
        assert_eq!(json["success"], true);
        assert_eq!(json["total"], 2);
        assert_eq!(json["page"], 1);
        assert_eq!(json["pages"], 1);
    }

    #[test]
    fn test_error_body_is_unsuccessful() {
        let body = ErrorBody::new("Not Found", "Hotel not found");
        let json = serde_json::to_value(&body).unwrap();
        assert_eq!(json["success"], false);
        assert_eq!(json["error"], "Not Found");
    }
}
