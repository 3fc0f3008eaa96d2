//! 握手阶段的身份元数据提取
//!
//! 优先取查询参数，其次取请求头；都没有时使用空字符串，不拒绝连接。

use axum::http::HeaderMap;
use domain::ConnectionMetadata;
use serde::Deserialize;

pub const PUBLIC_ID_HEADER: &str = "x-public-id";
pub const PRIVATE_ID_HEADER: &str = "x-private-id";
pub const DISPLAY_NAME_HEADER: &str = "x-display-name";

/// WebSocket 连接查询参数
#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ConnectQuery {
    pub public_id: Option<String>,
    pub private_id: Option<String>,
    pub display_name: Option<String>,
}

pub fn connection_metadata(query: ConnectQuery, headers: &HeaderMap) -> ConnectionMetadata {
    ConnectionMetadata::from_parts(
        query.public_id.or_else(|| header_value(headers, PUBLIC_ID_HEADER)),
        query.private_id.or_else(|| header_value(headers, PRIVATE_ID_HEADER)),
        query.display_name.or_else(|| header_value(headers, DISPLAY_NAME_HEADER)),
    )
}

fn header_value(headers: &HeaderMap, name: &str) -> Option<String> {
    headers
        .get(name)
        .and_then(|value| value.to_str().ok())
        .map(str::to_owned)
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::HeaderValue;

    #[test]
    fn query_takes_precedence_over_headers() {
        let mut headers = HeaderMap::new();
        headers.insert(PUBLIC_ID_HEADER, HeaderValue::from_static("from-header"));
        headers.insert(DISPLAY_NAME_HEADER, HeaderValue::from_static("Header Name"));

        let metadata = connection_metadata(
            ConnectQuery {
                public_id: Some("u1".into()),
                private_id: Some("p1".into()),
                display_name: None,
            },
            &headers,
        );
        assert_eq!(metadata, ConnectionMetadata::new("u1", "p1", "Header Name"));
    }

    #[test]
    fn missing_everything_yields_blank_metadata() {
        let metadata = connection_metadata(ConnectQuery::default(), &HeaderMap::new());
        assert_eq!(metadata, ConnectionMetadata::default());
    }

    #[test]
    fn non_utf8_header_is_treated_as_missing() {
        let mut headers = HeaderMap::new();
        headers.insert(PRIVATE_ID_HEADER, HeaderValue::from_bytes(&[0xff, 0xfe]).unwrap());
        let metadata = connection_metadata(ConnectQuery::default(), &headers);
        assert_eq!(metadata.private_id, "");
    }
}
