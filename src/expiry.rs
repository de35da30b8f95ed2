use crate::state::AppState;
use crate::types::*;
use std::sync::Arc;

/// Spawn a timer that releases a dropped player's slot once the reconnect grace runs out.
///
/// A rejoin in the meantime moves the slot to a new connection id, so the
/// expiry for the old id finds nothing to release.
pub fn spawn_reconnect_expiry(state: Arc<AppState>, connection_id: ConnectionId, room: RoomCode) {
    let grace = state.config.reconnect_grace;
    if grace.is_zero() {
        return;
    }

    tokio::spawn(async move {
        tokio::time::sleep(grace).await;
        tracing::debug!(room = %room, connection = %connection_id, "Reconnect grace elapsed");
        state.expire_slot(&connection_id, &room).await;
    });
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::GameConfig;
    use crate::deck::WordCatalogue;
    use std::time::Duration;

    #[tokio::test(start_paused = true)]
    async fn test_slot_released_after_grace() {
        let config = GameConfig {
            reconnect_grace: Duration::from_secs(30),
            ..GameConfig::default()
        };
        let state = Arc::new(AppState::new(config, WordCatalogue::builtin()));

        let (ana, _rx_a) = state.register_connection().await;
        let (bo, _rx_b) = state.register_connection().await;
        state.join_room(&ana, "R1", "Ana").await.unwrap();
        state.join_room(&bo, "R1", "Bo").await.unwrap();

        let room = state.disconnect(&bo).await.unwrap();
        spawn_reconnect_expiry(state.clone(), bo.clone(), room);

        tokio::time::sleep(Duration::from_secs(10)).await;
        assert_eq!(state.room_snapshot("R1").await.unwrap().players.len(), 2);

        tokio::time::sleep(Duration::from_secs(30)).await;
        assert_eq!(state.room_snapshot("R1").await.unwrap().players.len(), 1);
    }
}
