//! HTTP request handlers: metrics exposition and health.

use axum::body::Body;
use axum::extract::State;
use axum::http::{StatusCode, header};
use axum::response::Response;
use prometheus::{Encoder, Registry, TextEncoder};
use tracing::{debug, error};

pub(crate) async fn handle_health() -> &'static str {
    "ok"
}

/// Gathers every registered collector and renders the text exposition format.
///
/// Collectors run external commands and read `/proc`, so gathering happens on
/// the blocking pool.
pub(crate) async fn handle_metrics(
    State(registry): State<Registry>,
) -> Result<Response, StatusCode> {
    let families = tokio::task::spawn_blocking(move || registry.gather())
        .await
        .map_err(|e| {
            error!(error = %e, "gather panicked");
            StatusCode::INTERNAL_SERVER_ERROR
        })?;

    let mut buf = Vec::new();
    TextEncoder::new()
        .encode(&families, &mut buf)
        .map_err(|e| {
            error!(error = %e, "failed to encode metrics");
            StatusCode::INTERNAL_SERVER_ERROR
        })?;
    debug!(families = families.len(), bytes = buf.len(), "served metrics");

    Response::builder()
        .header(header::CONTENT_TYPE, prometheus::TEXT_FORMAT)
        .body(Body::from(buf))
        .map_err(|_| StatusCode::INTERNAL_SERVER_ERROR)
}

#[cfg(test)]
mod tests {
    use super::*;
    use smbmetrics_core::collector::mock::{MockCommand, MockFs};
    use smbmetrics_core::config::ExporterConfig;
    use smbmetrics_core::exporter::register_collectors;

    async fn body_text(resp: Response) -> String {
        let bytes = axum::body::to_bytes(resp.into_body(), usize::MAX)
            .await
            .unwrap();
        String::from_utf8(bytes.to_vec()).unwrap()
    }

    #[tokio::test]
    async fn test_health() {
        assert_eq!(handle_health().await, "ok");
    }

    #[tokio::test]
    async fn test_metrics_exposition() {
        let registry = Registry::new();
        register_collectors(
            &registry,
            MockFs::smbd_host(),
            MockCommand::samba_server(),
            &ExporterConfig::default(),
        )
        .unwrap();

        let resp = handle_metrics(State(registry)).await.unwrap();
        assert_eq!(resp.status(), StatusCode::OK);
        assert_eq!(
            resp.headers().get(header::CONTENT_TYPE).unwrap(),
            prometheus::TEXT_FORMAT
        );

        let text = body_text(resp).await;
        assert!(text.contains("# TYPE smb_smbd_up_status gauge"));
        assert!(text.contains("smb_smbd_up_status 1"));
        assert!(text.contains("smb_sessions_total 2"));
        assert!(text.contains("smb_share_activity{service=\"public\"} 2"));
        assert!(text.contains("smb_netbytes_sent 21000"));
    }

    #[tokio::test]
    async fn test_metrics_with_nothing_running() {
        let registry = Registry::new();
        register_collectors(
            &registry,
            MockFs::new(),
            MockCommand::new(),
            &ExporterConfig::default(),
        )
        .unwrap();

        let text = body_text(handle_metrics(State(registry)).await.unwrap()).await;
        assert!(text.contains("smb_smbd_up_status 0"));
        assert!(text.contains("smb_sessions_total 0"));
        assert!(!text.contains("smb_share_activity"));
    }
}
