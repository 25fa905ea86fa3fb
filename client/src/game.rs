use shared::{
    clamp_paddle_y, DecodeError, GameState, PaddleInput, SharedGameState, Side, WireRecord,
    PADDLE_SPEED, SEND_INTERVAL, START_PADDLE_Y,
};
use std::sync::Arc;

/// Client-side view of the game.
///
/// The controlled paddle lives in `local_y` and moves the moment a key is
/// held. Everything else (the other paddle and the ball) comes from the
/// mirror, which snapshots overwrite wholesale. Snapshots never touch
/// `local_y`, so the server's clamped copy of our own paddle is not shown.
pub struct ClientPredictor {
    player_id: u32,
    side: Side,
    local_y: f32,
    since_last_send: f32,
    mirror: Arc<SharedGameState>,
}

impl ClientPredictor {
    pub fn new(player_id: u32) -> Self {
        Self {
            player_id,
            side: Self::controlled_side(player_id),
            local_y: START_PADDLE_Y,
            since_last_send: 0.0,
            mirror: Arc::new(SharedGameState::new(GameState::new())),
        }
    }

    /// Player 1 drives the left paddle; every other id drives the right one.
    pub fn controlled_side(player_id: u32) -> Side {
        if player_id == 1 {
            Side::Left
        } else {
            Side::Right
        }
    }

    pub fn player_id(&self) -> u32 {
        self.player_id
    }

    pub fn side(&self) -> Side {
        self.side
    }

    pub fn local_y(&self) -> f32 {
        self.local_y
    }

    /// Handle to the mirrored state, for whoever receives snapshots.
    pub fn mirror(&self) -> Arc<SharedGameState> {
        Arc::clone(&self.mirror)
    }

    /// Advances one render frame.
    ///
    /// `axis` is -1 (up), 0 or 1 (down). The local paddle moves by the frame
    /// time; the returned input, if any, is sized by the fixed send interval.
    /// At most one input is produced per interval and none while idle.
    pub fn update(&mut self, axis: f32, frame_dt: f32) -> Option<PaddleInput> {
        let axis = if axis.is_nan() {
            0.0
        } else {
            axis.clamp(-1.0, 1.0)
        };

        self.local_y = clamp_paddle_y(self.local_y + axis * PADDLE_SPEED * frame_dt);
        self.since_last_send += frame_dt;

        let dy = axis * PADDLE_SPEED * SEND_INTERVAL;
        if dy != 0.0 && self.since_last_send >= SEND_INTERVAL {
            self.since_last_send = 0.0;
            return Some(PaddleInput {
                id: self.player_id,
                dy,
            });
        }

        None
    }

    /// Overwrites the mirror with an authoritative snapshot.
    pub fn apply_snapshot(&self, snapshot: GameState) {
        self.mirror.replace(snapshot);
    }

    /// Copies the mirror out and puts the predicted paddle in place.
    pub fn render_state(&self) -> GameState {
        let mut state = self.mirror.snapshot();
        state.paddle_mut(self.side).y = self.local_y;
        state
    }
}

/// Decodes a `state` payload into the mirror. The last snapshot to arrive
/// wins, whatever its age.
pub fn reconcile(mirror: &SharedGameState, payload: &[u8]) -> Result<GameState, DecodeError> {
    let snapshot = GameState::decode(payload)?;
    mirror.replace(snapshot);
    Ok(snapshot)
}
