//! 单元测试用的发布器与时钟替身

use std::future::Future;
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use chrono::{Duration, TimeZone, Utc};
use domain::{ChannelAddress, ConnectionId, HubEvent, Timestamp};

use crate::clock::Clock;
use crate::publisher::{ChannelPublisher, Envelope, PublishError};
use crate::registry::SessionRegistry;

/// 记录每一次发布，便于断言投递地址
#[derive(Default)]
pub struct RecordingPublisher {
    published: Mutex<Vec<Envelope>>,
}

impl RecordingPublisher {
    pub fn envelopes(&self) -> Vec<Envelope> {
        self.published.lock().unwrap().clone()
    }

    pub fn addresses(&self) -> Vec<ChannelAddress> {
        self.envelopes().into_iter().map(|e| e.address).collect()
    }

    pub fn events_to(&self, address: &ChannelAddress) -> Vec<HubEvent> {
        self.envelopes()
            .into_iter()
            .filter(|e| &e.address == address)
            .map(|e| e.event)
            .collect()
    }

    pub fn clear(&self) {
        self.published.lock().unwrap().clear();
    }
}

#[async_trait]
impl ChannelPublisher for RecordingPublisher {
    async fn publish(&self, address: &ChannelAddress, event: HubEvent) -> Result<(), PublishError> {
        self.published
            .lock()
            .unwrap()
            .push(Envelope::new(address.clone(), event));
        Ok(())
    }
}

/// 发布时先抢一次注册表写锁再记录。
///
/// 调用方若在持有注册表锁（读或写）时发布，这里就会一直等下去。
pub struct ReentrantPublisher {
    registry: Arc<SessionRegistry>,
    recorded: RecordingPublisher,
}

impl ReentrantPublisher {
    pub fn new(registry: Arc<SessionRegistry>) -> Self {
        Self {
            registry,
            recorded: RecordingPublisher::default(),
        }
    }

    pub fn addresses(&self) -> Vec<ChannelAddress> {
        self.recorded.addresses()
    }
}

#[async_trait]
impl ChannelPublisher for ReentrantPublisher {
    async fn publish(&self, address: &ChannelAddress, event: HubEvent) -> Result<(), PublishError> {
        self.registry
            .update_flags(&ConnectionId::from("unregistered"), false, false)
            .await;
        self.recorded.publish(address, event).await
    }
}

/// 给操作设一个期限；超时说明发布时注册表锁仍被持有
pub async fn within_deadline<F: Future>(operation: F) -> F::Output {
    tokio::time::timeout(std::time::Duration::from_secs(2), operation)
        .await
        .expect("registry lock was held while publishing")
}

/// 每次调用前进一秒的确定性时钟
pub struct SteppingClock {
    ticks: Mutex<i64>,
}

impl SteppingClock {
    pub fn new() -> Self {
        Self { ticks: Mutex::new(0) }
    }

    pub fn epoch() -> Timestamp {
        Utc.with_ymd_and_hms(2024, 1, 1, 0, 0, 0).unwrap()
    }
}

impl Clock for SteppingClock {
    fn now(&self) -> Timestamp {
        let mut ticks = self.ticks.lock().unwrap();
        *ticks += 1;
        Self::epoch() + Duration::seconds(*ticks)
    }
}

/// 最后一条在线列表事件中的用户名
pub fn last_presence_names(publisher: &RecordingPublisher) -> Option<Vec<String>> {
    publisher
        .events_to(&ChannelAddress::Presence)
        .into_iter()
        .last()
        .map(|event| match event {
            HubEvent::Presence { users } => users.into_iter().map(|u| u.display_name).collect(),
            other => panic!("unexpected event on presence channel: {other:?}"),
        })
}
