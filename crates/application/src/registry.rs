//! 会话注册表
//!
//! 以连接ID为键保存在线记录，是核心里唯一的共享可变状态。
//! 整张表由一把读写锁保护：查询走读锁，增删改走写锁。
//! 所有返回值都是快照，调用方拿到后不再持有锁。

use std::collections::{BTreeSet, HashMap};

use domain::{ConnectionId, PresenceRecord};
use tokio::sync::RwLock;

pub struct SessionRegistry {
    sessions: RwLock<HashMap<ConnectionId, PresenceRecord>>,
}

impl Default for SessionRegistry {
    fn default() -> Self {
        Self::new()
    }
}

impl SessionRegistry {
    pub fn new() -> Self {
        Self {
            sessions: RwLock::new(HashMap::new()),
        }
    }

    /// 插入或覆盖记录，返回被覆盖的旧记录
    pub async fn add(&self, record: PresenceRecord) -> Option<PresenceRecord> {
        let mut sessions = self.sessions.write().await;
        sessions.insert(record.connection_id.clone(), record)
    }

    pub async fn get(&self, connection_id: &ConnectionId) -> Option<PresenceRecord> {
        let sessions = self.sessions.read().await;
        sessions.get(connection_id).cloned()
    }

    /// 移除记录；不存在时什么也不做。返回被移除的记录
    pub async fn remove(&self, connection_id: &ConnectionId) -> Option<PresenceRecord> {
        let mut sessions = self.sessions.write().await;
        sessions.remove(connection_id)
    }

    /// 当前所有记录的快照，按连接时间排序
    pub async fn all_records(&self) -> Vec<PresenceRecord> {
        let mut records: Vec<PresenceRecord> = {
            let sessions = self.sessions.read().await;
            sessions.values().cloned().collect()
        };
        sort_by_arrival(&mut records);
        records
    }

    /// 线性扫描查找公开ID落在 `public_ids` 中的记录。
    ///
    /// 公开ID不唯一，同一个ID可能匹配多条记录（例如重复登录）。
    /// 复杂度 O(n·|ids|)，只适用于聊天室规模的参与者数量。
    pub async fn find_by_public_ids(&self, public_ids: &BTreeSet<String>) -> Vec<PresenceRecord> {
        if public_ids.is_empty() {
            return Vec::new();
        }
        let mut records: Vec<PresenceRecord> = {
            let sessions = self.sessions.read().await;
            sessions
                .values()
                .filter(|record| public_ids.contains(&record.public_id))
                .cloned()
                .collect()
        };
        sort_by_arrival(&mut records);
        records
    }

    /// 原地更新隐身/忙碌标记；记录不存在时返回 false
    pub async fn update_flags(&self, connection_id: &ConnectionId, hidden: bool, busy: bool) -> bool {
        let mut sessions = self.sessions.write().await;
        match sessions.get_mut(connection_id) {
            Some(record) => {
                record.hidden = hidden;
                record.busy = busy;
                true
            }
            None => false,
        }
    }

    pub async fn len(&self) -> usize {
        self.sessions.read().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.sessions.read().await.is_empty()
    }
}

fn sort_by_arrival(records: &mut [PresenceRecord]) {
    records.sort_by(|a, b| {
        a.connected_at
            .cmp(&b.connected_at)
            .then_with(|| a.connection_id.cmp(&b.connection_id))
    });
}
