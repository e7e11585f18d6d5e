use std::{collections::HashMap, fmt, sync::Arc};

use teloxide::types::ChatId;
use tokio::sync::Mutex;

use crate::dialogue::State;

#[derive(Clone, Debug, Default)]
pub(crate) struct Session {
    pub state: State,
}

/// Who a dialogue belongs to: one user inside one chat.
///
/// Users sharing a group chat each get their own dialogue.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub(crate) struct SessionKey {
    pub chat_id: ChatId,
    pub user_id: i64,
}

impl SessionKey {
    pub(crate) fn new(chat_id: ChatId, user_id: i64) -> Self {
        Self { chat_id, user_id }
    }
}

impl fmt::Display for SessionKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "chat {} user {}", self.chat_id, self.user_id)
    }
}

/// In-memory dialogue state, one entry per user and chat. Lost on restart.
#[derive(Clone, Default)]
pub(crate) struct SessionStore {
    inner: Arc<Mutex<HashMap<SessionKey, Session>>>,
}

impl SessionStore {
    pub(crate) async fn get(&self, key: SessionKey) -> Session {
        let guard = self.inner.lock().await;
        guard.get(&key).cloned().unwrap_or_default()
    }

    pub(crate) async fn update<F>(&self, key: SessionKey, f: F) -> Session
    where
        F: FnOnce(&mut Session),
    {
        let mut guard = self.inner.lock().await;
        let session = guard.entry(key).or_insert_with(Session::default);
        f(session);
        session.clone()
    }

    pub(crate) async fn set_state(&self, key: SessionKey, state: State) {
        self.update(key, |s| s.state = state).await;
    }

    pub(crate) async fn reset(&self, key: SessionKey) {
        self.inner.lock().await.remove(&key);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn sessions_are_kept_per_chat() {
        let store = SessionStore::default();
        let first = SessionKey::new(ChatId(1), 7);
        let second = SessionKey::new(ChatId(2), 7);

        store.set_state(first, State::GoalsMenu).await;
        assert_eq!(store.get(first).await.state, State::GoalsMenu);
        assert_eq!(store.get(second).await.state, State::Idle);

        store.reset(first).await;
        assert_eq!(store.get(first).await.state, State::Idle);
    }

    #[tokio::test]
    async fn users_in_one_group_keep_their_own_dialogue() {
        let store = SessionStore::default();
        let group = ChatId(-100);
        let alice = SessionKey::new(group, 1);
        let bob = SessionKey::new(group, 2);

        store.set_state(alice, State::GoalsMenu).await;
        store.set_state(bob, State::RegistrationName).await;
        assert_eq!(store.get(alice).await.state, State::GoalsMenu);
        assert_eq!(store.get(bob).await.state, State::RegistrationName);

        store.reset(bob).await;
        assert_eq!(store.get(alice).await.state, State::GoalsMenu);
        assert_eq!(store.get(bob).await.state, State::Idle);
    }
}
