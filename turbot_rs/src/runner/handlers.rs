//! What to do with each record a scraper prints.

use serde_json::Value;
use tracing::debug;

use crate::api::{ApiClient, DraftDataReceipt};
use crate::console::Console;
use crate::error::Result;

/// Records sent per `draft_data` request.
pub const BATCH_SIZE: usize = 20;

pub trait RecordHandler {
    fn handle_valid_record(
        &mut self,
        console: &mut Console,
        record: &Value,
        data_type: &str,
    ) -> Result<()>;

    fn handle_invalid_record(
        &mut self,
        console: &mut Console,
        record: &Value,
        _data_type: &str,
        message: &str,
    ) {
        console.blank_line();
        console.display("The following record is invalid:");
        console.display(&record.to_string());
        console.display(&format!(" * {}", message));
        console.blank_line();
    }

    fn handle_invalid_json(&mut self, console: &mut Console, line: &str) {
        console.blank_line();
        console.display("The following line was not valid JSON:");
        console.display(line);
    }
}

/// Counts valid records, printing a dot for each.
#[derive(Debug, Default)]
pub struct ValidationHandler {
    count: usize,
}

impl ValidationHandler {
    pub fn count(&self) -> usize {
        self.count
    }
}

impl RecordHandler for ValidationHandler {
    fn handle_valid_record(&mut self, console: &mut Console, _: &Value, _: &str) -> Result<()> {
        self.count += 1;
        console.display_inline(".");
        Ok(())
    }
}

/// Prints valid records as JSON lines.
#[derive(Debug, Default)]
pub struct DumpHandler;

impl RecordHandler for DumpHandler {
    fn handle_valid_record(&mut self, console: &mut Console, record: &Value, _: &str) -> Result<()> {
        console.display(&record.to_string());
        Ok(())
    }
}

/// Streams valid records to the draft-data endpoint in batches.
pub struct PreviewHandler<'a> {
    api: &'a ApiClient,
    bot_id: String,
    batch: Vec<Value>,
    count: usize,
}

impl<'a> PreviewHandler<'a> {
    pub fn new(api: &'a ApiClient, bot_id: impl Into<String>) -> Self {
        Self {
            api,
            bot_id: bot_id.into(),
            batch: Vec::with_capacity(BATCH_SIZE),
            count: 0,
        }
    }

    pub fn count(&self) -> usize {
        self.count
    }

    /// Records waiting for the next submit.
    pub fn pending(&self) -> usize {
        self.batch.len()
    }

    /// Send whatever is pending, even if that is nothing.
    pub fn submit_batch(&mut self) -> Result<DraftDataReceipt> {
        let batch = std::mem::take(&mut self.batch);
        debug!(bot = %self.bot_id, records = batch.len(), "submitting draft data");
        Ok(self.api.create_draft_data(&self.bot_id, &batch)?)
    }
}

impl RecordHandler for PreviewHandler<'_> {
    fn handle_valid_record(
        &mut self,
        console: &mut Console,
        record: &Value,
        data_type: &str,
    ) -> Result<()> {
        self.count += 1;
        console.display_inline(".");
        let mut record = record.clone();
        if let Value::Object(map) = &mut record {
            map.insert("data_type".to_string(), Value::String(data_type.to_string()));
        }
        self.batch.push(record);
        if self.count % BATCH_SIZE == 0 {
            self.submit_batch()?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use std::io::Read;
    use std::sync::{Arc, Mutex};
    use std::thread;

    #[test]
    fn test_invalid_output_format() {
        let mut console = Console::memory::<&str>(&[]);
        let mut handler = ValidationHandler::default();
        handler.handle_invalid_record(&mut console, &json!({"a": 1}), "t", "Missing identifying fields: n");
        handler.handle_invalid_json(&mut console, "{nope");
        assert_eq!(
            console.stdout_text(),
            "\nThe following record is invalid:\n{\"a\":1}\n * Missing identifying fields: n\n\n\nThe following line was not valid JSON:\n{nope\n"
        );
    }

    #[test]
    fn test_dump_prints_json_lines() {
        let mut console = Console::memory::<&str>(&[]);
        let mut handler = DumpHandler;
        handler
            .handle_valid_record(&mut console, &json!({"n": 1}), "t")
            .expect("dump");
        assert_eq!(console.stdout_text(), "{\"n\":1}\n");
    }

    #[test]
    fn test_preview_flushes_every_twenty_records() {
        let server = tiny_http::Server::http("127.0.0.1:0").expect("server");
        let port = server.server_addr().to_ip().map(|a| a.port()).expect("port");
        let bodies = Arc::new(Mutex::new(Vec::<Value>::new()));
        let seen = Arc::clone(&bodies);
        let worker = thread::spawn(move || {
            for _ in 0..2 {
                let Ok(mut request) = server.recv() else { break };
                let mut body = String::new();
                request.as_reader().read_to_string(&mut body).expect("body");
                seen.lock().expect("lock").push(serde_json::from_str(&body).expect("json"));
                let response = tiny_http::Response::from_string(r#"{"data":{"url":"http://x/preview"}}"#);
                request.respond(response).expect("respond");
            }
        });

        let api = ApiClient::new(format!("http://127.0.0.1:{}", port), Some("k".into())).expect("client");
        let mut console = Console::memory::<&str>(&[]);
        let mut handler = PreviewHandler::new(&api, "my_bot");
        for n in 0..25 {
            handler
                .handle_valid_record(&mut console, &json!({"n": n}), "primary data")
                .expect("record");
        }
        assert_eq!(handler.pending(), 5);
        let receipt = handler.submit_batch().expect("final batch");
        worker.join().expect("server thread");

        assert_eq!(handler.count(), 25);
        assert_eq!(handler.pending(), 0);
        assert_eq!(receipt.url.as_deref(), Some("http://x/preview"));
        assert_eq!(console.stdout_text(), ".".repeat(25));

        let bodies = bodies.lock().expect("lock");
        assert_eq!(bodies[0]["batch"].as_array().map(Vec::len), Some(20));
        assert_eq!(bodies[1]["batch"].as_array().map(Vec::len), Some(5));
        assert_eq!(bodies[0]["batch"][0], json!({"n": 0, "data_type": "primary data"}));
    }
}
