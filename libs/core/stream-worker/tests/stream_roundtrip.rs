//! Producer to worker round trip against a real Redis.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::sync::{Arc, Mutex};
use std::time::Duration;
use stream_worker::{
    StreamDef, StreamError, StreamJob, StreamProcessor, StreamProducer, StreamWorker, WorkerConfig,
};
use test_utils::TestRedis;
use tokio::sync::watch;

struct WelcomeStream;

impl StreamDef for WelcomeStream {
    const STREAM_NAME: &'static str = "welcome-events";
    const CONSUMER_GROUP: &'static str = "welcome-workers";
}

#[derive(Clone, Debug, Serialize, Deserialize)]
struct Welcome {
    email: String,
}

impl StreamJob for Welcome {
    fn job_id(&self) -> String {
        self.email.clone()
    }
}

#[derive(Default)]
struct Collect {
    emails: Mutex<Vec<String>>,
}

#[async_trait]
impl StreamProcessor<Welcome> for Collect {
    async fn process(&self, job: &Welcome) -> Result<(), StreamError> {
        self.emails.lock().unwrap().push(job.email.clone());
        if job.email.starts_with("broken") {
            return Err(StreamError::processing("smtp down"));
        }
        Ok(())
    }

    fn name(&self) -> &'static str {
        "Collect"
    }
}

#[tokio::test]
#[ignore = "requires docker"]
async fn test_worker_processes_and_acknowledges_every_entry() {
    let redis = TestRedis::new().await;
    let processor = Arc::new(Collect::default());
    let config = WorkerConfig::from_stream_def::<WelcomeStream>().with_block_timeout_ms(100);
    let worker = StreamWorker::new(redis.manager().await, Arc::clone(&processor), config);
    let (shutdown_tx, shutdown_rx) = watch::channel(false);
    let handle = tokio::spawn(async move { worker.run(shutdown_rx).await });

    let producer = StreamProducer::from_stream_def::<WelcomeStream>(redis.manager().await);
    producer.send(&Welcome { email: "a@example.com".into() }).await.unwrap();
    producer.send(&Welcome { email: "broken@example.com".into() }).await.unwrap();

    tokio::time::timeout(Duration::from_secs(10), async {
        while processor.emails.lock().unwrap().len() < 2 {
            tokio::time::sleep(Duration::from_millis(50)).await;
        }
    })
    .await
    .expect("worker did not process both entries");

    shutdown_tx.send(true).unwrap();
    handle.await.unwrap().unwrap();

    let mut conn = redis.manager().await;
    let (pending, _, _, _): (u64, Option<String>, Option<String>, Option<Vec<(String, String)>>) =
        redis::cmd("XPENDING")
            .arg(WelcomeStream::STREAM_NAME)
            .arg(WelcomeStream::CONSUMER_GROUP)
            .query_async(&mut conn)
            .await
            .unwrap();
    assert_eq!(pending, 0, "failed entries are acknowledged too");
}
