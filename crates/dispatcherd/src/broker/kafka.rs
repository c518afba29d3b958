//! Kafka adapter for the broker seams.
//!
//! Each side binds to exactly one topic partition. The read side assigns the
//! partition directly rather than joining a rebalancing group, and the write
//! side pins every record to the configured partition.

use std::sync::{Mutex, PoisonError};
use std::time::Duration;

use rdkafka::client::Client as KafkaClient;
use rdkafka::consumer::{BaseConsumer, Consumer};
use rdkafka::producer::{BaseProducer, BaseRecord, DeliveryResult, Producer, ProducerContext};
use rdkafka::{ClientConfig, ClientContext, Message, Offset, TopicPartitionList};
use tracing::info;

use dispatcher_config::{PartitionSide, StartOffset};

use super::{
    BROKER_TARGET, BrokerConnector, BrokerError, BrokerSettings, CommandSource, InboundMessage,
    OutboundMessage, PublishError, ReceiveError, ResultSink, TopicTarget,
};

/// Bound on the metadata round trip performed while connecting.
pub const CONNECT_TIMEOUT: Duration = Duration::from_secs(10);

/// Opens Kafka consumers and producers.
#[derive(Debug, Default, Clone, Copy)]
pub struct KafkaConnector;

impl KafkaConnector {
    /// Builds a connector.
    #[must_use]
    pub fn new() -> Self {
        Self
    }
}

/// Maps the configured protocol name onto librdkafka's `security.protocol`.
///
/// `tcp`, `plaintext` and the empty string select plaintext; `tls` is an
/// alias for `ssl`. Anything else is passed through lowercased.
#[must_use]
pub fn security_protocol(raw: &str) -> String {
    let normalised = raw.trim().to_ascii_lowercase();
    match normalised.as_str() {
        "" | "tcp" | "plaintext" => "plaintext".to_owned(),
        "tls" => "ssl".to_owned(),
        _ => normalised,
    }
}

fn start_position(start: StartOffset) -> Offset {
    match start {
        StartOffset::Beginning => Offset::Beginning,
        StartOffset::End => Offset::End,
        StartOffset::Stored => Offset::Stored,
    }
}

fn offset_reset(start: StartOffset) -> &'static str {
    match start {
        StartOffset::End => "latest",
        StartOffset::Beginning | StartOffset::Stored => "earliest",
    }
}

fn base_config(settings: &BrokerSettings) -> ClientConfig {
    let mut config = ClientConfig::new();
    config
        .set("bootstrap.servers", &settings.address)
        .set("security.protocol", security_protocol(&settings.protocol));
    config
}

/// Confirms the target partition exists and has been reported by the broker.
fn verify_partition<C: ClientContext>(
    client: &KafkaClient<C>,
    side: PartitionSide,
    settings: &BrokerSettings,
    target: &TopicTarget,
) -> Result<(), BrokerError> {
    let failure =
        |message: String| BrokerError::connect(side, &settings.address, &target.topic, message);

    let metadata = client
        .fetch_metadata(Some(target.topic.as_str()), CONNECT_TIMEOUT)
        .map_err(|error| failure("metadata request failed".to_owned()).with_source(error))?;

    let topic = metadata
        .topics()
        .iter()
        .find(|topic| topic.name() == target.topic)
        .ok_or_else(|| failure("topic not reported by broker".to_owned()))?;
    if let Some(error) = topic.error() {
        return Err(failure(format!("topic unavailable: {error:?}")));
    }

    let partition = target.partition.get();
    if topic.partitions().iter().any(|entry| entry.id() == partition) {
        Ok(())
    } else {
        Err(failure(format!("partition {partition} does not exist")))
    }
}

impl BrokerConnector for KafkaConnector {
    type Source = KafkaSource;
    type Sink = KafkaSink;

    fn connect_sink(
        &self,
        settings: &BrokerSettings,
        target: &TopicTarget,
    ) -> Result<KafkaSink, BrokerError> {
        let deadline_ms = settings.write_deadline.as_millis().max(1).to_string();
        let producer: BaseProducer<DeliveryTracker> = base_config(settings)
            .set("message.timeout.ms", deadline_ms)
            .create_with_context(DeliveryTracker::default())
            .map_err(|error| {
                BrokerError::connect(
                    PartitionSide::Write,
                    &settings.address,
                    &target.topic,
                    "failed to create producer",
                )
                .with_source(error)
            })?;
        verify_partition(producer.client(), PartitionSide::Write, settings, target)?;

        info!(
            target: BROKER_TARGET,
            topic = %target.topic,
            partition = target.partition.get(),
            "write side connected"
        );
        Ok(KafkaSink {
            producer,
            topic: target.topic.clone(),
            partition: target.partition.get(),
        })
    }

    fn connect_source(
        &self,
        settings: &BrokerSettings,
        target: &TopicTarget,
    ) -> Result<KafkaSource, BrokerError> {
        let failure = |message: &str| {
            BrokerError::connect(PartitionSide::Read, &settings.address, &target.topic, message)
        };

        let consumer: BaseConsumer = base_config(settings)
            .set("group.id", &settings.consumer_group)
            .set("enable.auto.commit", "true")
            .set("enable.partition.eof", "false")
            .set(
                "max.partition.fetch.bytes",
                settings.read_max_bytes.to_string(),
            )
            .set("auto.offset.reset", offset_reset(settings.start_offset))
            .create()
            .map_err(|error| failure("failed to create consumer").with_source(error))?;
        verify_partition(consumer.client(), PartitionSide::Read, settings, target)?;

        let mut assignment = TopicPartitionList::new();
        assignment
            .add_partition_offset(
                &target.topic,
                target.partition.get(),
                start_position(settings.start_offset),
            )
            .map_err(|error| failure("invalid start offset").with_source(error))?;
        consumer
            .assign(&assignment)
            .map_err(|error| failure("partition assignment failed").with_source(error))?;

        info!(
            target: BROKER_TARGET,
            topic = %target.topic,
            partition = target.partition.get(),
            start = %settings.start_offset,
            "read side connected"
        );
        Ok(KafkaSource { consumer })
    }
}

/// Consumer bound to the inbound partition.
pub struct KafkaSource {
    consumer: BaseConsumer,
}

impl CommandSource for KafkaSource {
    fn receive(&mut self, wait: Duration) -> Result<InboundMessage, ReceiveError> {
        match self.consumer.poll(wait) {
            None => Err(ReceiveError::TimedOut { wait }),
            Some(Err(error)) => Err(ReceiveError::broker("poll failed", error)),
            Some(Ok(message)) => Ok(InboundMessage::new(
                message.payload().unwrap_or_default(),
                message.partition(),
                message.offset(),
            )),
        }
    }
}

/// Producer bound to the outbound partition.
pub struct KafkaSink {
    producer: BaseProducer<DeliveryTracker>,
    topic: String,
    partition: i32,
}

impl ResultSink for KafkaSink {
    fn publish(
        &mut self,
        message: &OutboundMessage,
        deadline: Duration,
    ) -> Result<(), PublishError> {
        let tracker = self.producer.context();
        tracker.reset();

        let record = BaseRecord::<str, [u8]>::to(&self.topic)
            .partition(self.partition)
            .key(message.key.as_str())
            .payload(message.payload.as_slice());
        self.producer
            .send(record)
            .map_err(|(error, _)| PublishError::enqueue(message.key.as_str(), error))?;

        self.producer
            .flush(deadline)
            .map_err(|_| PublishError::Flush {
                key: message.key.clone(),
                deadline,
            })?;

        match tracker.take_failure() {
            Some(reason) => Err(PublishError::delivery(message.key.as_str(), reason)),
            None => Ok(()),
        }
    }
}

/// Producer context remembering the last delivery failure.
#[derive(Debug, Default)]
pub struct DeliveryTracker {
    failure: Mutex<Option<String>>,
}

impl DeliveryTracker {
    fn slot(&self) -> std::sync::MutexGuard<'_, Option<String>> {
        self.failure.lock().unwrap_or_else(PoisonError::into_inner)
    }

    fn record_failure(&self, reason: impl Into<String>) {
        *self.slot() = Some(reason.into());
    }

    fn reset(&self) {
        *self.slot() = None;
    }

    fn take_failure(&self) -> Option<String> {
        self.slot().take()
    }
}

impl ClientContext for DeliveryTracker {}

impl ProducerContext for DeliveryTracker {
    type DeliveryOpaque = ();

    fn delivery(&self, result: &DeliveryResult<'_>, _opaque: Self::DeliveryOpaque) {
        if let Err((error, _)) = result {
            self.record_failure(error.to_string());
        }
    }
}
