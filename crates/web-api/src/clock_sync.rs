use std::sync::Arc;
use std::time::Duration;

use application::{ChannelPublisher, Clock};
use domain::{ChannelAddress, HubEvent};
use tokio::task::JoinHandle;
use tokio::time::{interval, MissedTickBehavior};

/// 周期性地在公共频道广播服务器时间，供客户端校准时钟
pub fn spawn_clock_sync(
    publisher: Arc<dyn ChannelPublisher>,
    clock: Arc<dyn Clock>,
    period: Duration,
) -> JoinHandle<()> {
    tokio::spawn(async move {
        let mut ticker = interval(period);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Skip);
        loop {
            ticker.tick().await;
            let event = HubEvent::Clock {
                server_time: clock.now(),
            };
            if let Err(err) = publisher.publish(&ChannelAddress::Broadcast, event).await {
                tracing::warn!(error = %err, "时钟同步广播失败");
            }
        }
    })
}
