//! Remote sink: pushes the flattened row to the spreadsheet webhook.

use async_trait::async_trait;
use serde_json::Value;

use crate::persistence::{PersistenceError, ResultSink, SavedAssessment, SheetRow};
use crate::sheets::SheetsClient;

pub struct SheetsSink {
    client: SheetsClient,
}

impl SheetsSink {
    pub fn new(client: SheetsClient) -> Self {
        Self { client }
    }
}

#[async_trait]
impl ResultSink for SheetsSink {
    fn name(&self) -> &'static str {
        "sheets"
    }

    async fn save(&self, record: &SavedAssessment) -> Result<(), PersistenceError> {
        let reply = self.client.forward(&SheetRow::from(record)).await?;

        if reply.get("success").and_then(Value::as_bool) == Some(true) {
            Ok(())
        } else {
            let message = reply
                .get("message")
                .and_then(Value::as_str)
                .unwrap_or("Failed to save to spreadsheet");
            Err(PersistenceError::Rejected(message.to_string()))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::assessment::models::{AssessmentResult, Biodata};
    use crate::sheets::test_support::{spawn_webhook, FakeReply};
    use std::time::Duration;

    fn record() -> SavedAssessment {
        let result = AssessmentResult {
            success_rate: 82,
            strengths: vec![],
            weaknesses: vec!["security".to_string()],
            recommendations: vec![],
        };
        SavedAssessment::new(&Biodata::default(), None, &result)
    }

    fn sink(url: String) -> SheetsSink {
        SheetsSink::new(SheetsClient::new(Some(url), Duration::from_secs(5)).unwrap())
    }

    #[tokio::test]
    async fn test_accepted_row() {
        let url = spawn_webhook(FakeReply::Echo).await;
        sink(url).save(&record()).await.unwrap();
    }

    #[tokio::test]
    async fn test_rejected_row_carries_message() {
        let url = spawn_webhook(FakeReply::Raw(
            r#"cb({"success":false,"message":"Sheet is locked"})"#,
        ))
        .await;
        let err = sink(url).save(&record()).await.unwrap_err();
        assert!(matches!(err, PersistenceError::Rejected(msg) if msg == "Sheet is locked"));
    }

    #[tokio::test]
    async fn test_unconfigured_client_fails() {
        let sink = SheetsSink::new(SheetsClient::new(None, Duration::from_secs(5)).unwrap());
        let err = sink.save(&record()).await.unwrap_err();
        assert!(matches!(err, PersistenceError::Webhook(_)));
    }
}
