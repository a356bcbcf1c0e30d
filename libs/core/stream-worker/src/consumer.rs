//! Consumer-group reads and acknowledgements.

use crate::config::WorkerConfig;
use crate::error::StreamError;
use crate::event::StreamEvent;
use crate::registry::{MessageKey, StreamJob};
use redis::RedisResult;
use redis::aio::ConnectionManager;
use tracing::{debug, info, warn};

type StreamEntry = (String, Vec<(String, String)>);
type ReadReply = Vec<(String, Vec<StreamEntry>)>;

pub struct StreamConsumer {
    redis: ConnectionManager,
    config: WorkerConfig,
}

impl StreamConsumer {
    pub fn new(redis: ConnectionManager, config: WorkerConfig) -> Self {
        Self { redis, config }
    }

    /// Create the group (and the stream) unless it already exists.
    pub async fn ensure_consumer_group(&self) -> Result<(), StreamError> {
        let mut conn = self.redis.clone();

        let result: RedisResult<()> = redis::cmd("XGROUP")
            .arg("CREATE")
            .arg(&self.config.stream_name)
            .arg(&self.config.consumer_group)
            .arg("0")
            .arg("MKSTREAM")
            .query_async(&mut conn)
            .await;

        match result {
            Ok(()) => {
                info!(
                    stream = %self.config.stream_name,
                    group = %self.config.consumer_group,
                    "Created consumer group"
                );
                Ok(())
            }
            Err(e) if e.code() == Some("BUSYGROUP") => {
                debug!(group = %self.config.consumer_group, "Consumer group already exists");
                Ok(())
            }
            Err(e) => Err(StreamError::Redis(e)),
        }
    }

    /// Entries delivered to this consumer earlier but never acknowledged.
    pub async fn read_pending<J: StreamJob>(&self) -> Result<Vec<StreamEvent<J>>, StreamError> {
        let mut conn = self.redis.clone();

        let reply: ReadReply = redis::cmd("XREADGROUP")
            .arg("GROUP")
            .arg(&self.config.consumer_group)
            .arg(&self.config.consumer_id)
            .arg("COUNT")
            .arg(self.config.batch_size)
            .arg("STREAMS")
            .arg(&self.config.stream_name)
            .arg("0")
            .query_async(&mut conn)
            .await?;

        self.decode(reply.into_iter().flat_map(|(_, entries)| entries).collect())
            .await
    }

    /// Block up to `block_timeout_ms` for entries never delivered to the group.
    pub async fn read_new<J: StreamJob>(&self) -> Result<Vec<StreamEvent<J>>, StreamError> {
        let mut conn = self.redis.clone();

        let reply: Option<ReadReply> = redis::cmd("XREADGROUP")
            .arg("GROUP")
            .arg(&self.config.consumer_group)
            .arg(&self.config.consumer_id)
            .arg("BLOCK")
            .arg(self.config.block_timeout_ms)
            .arg("COUNT")
            .arg(self.config.batch_size)
            .arg("STREAMS")
            .arg(&self.config.stream_name)
            .arg(">")
            .query_async(&mut conn)
            .await?;

        match reply {
            Some(streams) => {
                self.decode(streams.into_iter().flat_map(|(_, entries)| entries).collect())
                    .await
            }
            None => Ok(Vec::new()),
        }
    }

    /// Take over entries another consumer left idle for longer than `claim_idle_ms`.
    pub async fn claim_abandoned<J: StreamJob>(&self) -> Result<Vec<StreamEvent<J>>, StreamError> {
        let mut conn = self.redis.clone();

        let pending: Vec<(String, String, u64, u64)> = redis::cmd("XPENDING")
            .arg(&self.config.stream_name)
            .arg(&self.config.consumer_group)
            .arg("-")
            .arg("+")
            .arg(self.config.batch_size)
            .query_async(&mut conn)
            .await?;

        let idle_ids: Vec<String> = pending
            .into_iter()
            .filter(|(_, owner, idle_ms, _)| {
                *owner != self.config.consumer_id && *idle_ms >= self.config.claim_idle_ms
            })
            .map(|(id, _, _, _)| id)
            .collect();

        if idle_ids.is_empty() {
            return Ok(Vec::new());
        }

        let mut cmd = redis::cmd("XCLAIM");
        cmd.arg(&self.config.stream_name)
            .arg(&self.config.consumer_group)
            .arg(&self.config.consumer_id)
            .arg(self.config.claim_idle_ms)
            .arg(&idle_ids);

        let entries: Vec<StreamEntry> = cmd.query_async(&mut conn).await?;
        if !entries.is_empty() {
            warn!(count = entries.len(), "Claimed abandoned entries");
        }

        self.decode(entries).await
    }

    pub async fn ack(&self, stream_ids: &[String]) -> Result<(), StreamError> {
        if stream_ids.is_empty() {
            return Ok(());
        }

        let mut conn = self.redis.clone();
        let acked: i64 = redis::cmd("XACK")
            .arg(&self.config.stream_name)
            .arg(&self.config.consumer_group)
            .arg(stream_ids)
            .query_async(&mut conn)
            .await?;

        debug!(acked, "Acknowledged entries");
        Ok(())
    }

    /// Decode entries and acknowledge the ones that can never be decoded.
    async fn decode<J: StreamJob>(
        &self,
        entries: Vec<StreamEntry>,
    ) -> Result<Vec<StreamEvent<J>>, StreamError> {
        let (events, malformed) = parse_entries(entries);
        self.ack(&malformed).await?;
        Ok(events)
    }
}

/// Split entries into decoded events and IDs of entries without a valid job field.
pub(crate) fn parse_entries<J: StreamJob>(
    entries: Vec<StreamEntry>,
) -> (Vec<StreamEvent<J>>, Vec<String>) {
    let mut events = Vec::with_capacity(entries.len());
    let mut malformed = Vec::new();

    for (stream_id, fields) in entries {
        let payload = fields
            .iter()
            .find(|(key, _)| key == MessageKey::Job.as_ref())
            .map(|(_, value)| value.as_str());

        match payload.map(serde_json::from_str::<J>) {
            Some(Ok(job)) => events.push(StreamEvent::new(stream_id, job)),
            Some(Err(e)) => {
                warn!(stream_id = %stream_id, error = %e, "Dropping entry with undecodable payload");
                malformed.push(stream_id);
            }
            None => {
                warn!(
                    stream_id = %stream_id,
                    fields = ?fields.iter().map(|(k, _)| k.as_str()).collect::<Vec<_>>(),
                    "Dropping entry without a job field"
                );
                malformed.push(stream_id);
            }
        }
    }

    (events, malformed)
}
