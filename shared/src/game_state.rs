use crate::{
    clamp_paddle_y, FIELD_HEIGHT, FIELD_WIDTH, PADDLE_HIT_RANGE, PADDLE_HIT_X_LEFT,
    PADDLE_HIT_X_RIGHT, START_BALL_VX, START_BALL_VY, START_BALL_X, START_BALL_Y,
    START_PADDLE_Y,
};
use serde::{Deserialize, Serialize};

/// A movement delta for one paddle, as sent by a client on the `input` topic.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PaddleInput {
    pub id: u32,
    pub dy: f32,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PaddleState {
    pub id: u32,
    /// Vertical centre of the paddle.
    pub y: f32,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct BallState {
    pub x: f32,
    pub y: f32,
    pub vx: f32,
    pub vy: f32,
}

/// Which paddle a player controls.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Side {
    Left,
    Right,
}

impl Side {
    /// Resolves the paddle owned by a player id; only ids 1 and 2 own one.
    pub fn from_player_id(id: u32) -> Option<Side> {
        match id {
            1 => Some(Side::Left),
            2 => Some(Side::Right),
            _ => None,
        }
    }
}

/// The complete game, published as one snapshot every tick.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct GameState {
    pub left: PaddleState,
    pub right: PaddleState,
    pub ball: BallState,
}

impl GameState {
    pub fn new() -> Self {
        Self {
            left: PaddleState {
                id: 1,
                y: START_PADDLE_Y,
            },
            right: PaddleState {
                id: 2,
                y: START_PADDLE_Y,
            },
            ball: BallState {
                x: START_BALL_X,
                y: START_BALL_Y,
                vx: START_BALL_VX,
                vy: START_BALL_VY,
            },
        }
    }

    pub fn paddle(&self, side: Side) -> &PaddleState {
        match side {
            Side::Left => &self.left,
            Side::Right => &self.right,
        }
    }

    pub fn paddle_mut(&mut self, side: Side) -> &mut PaddleState {
        match side {
            Side::Left => &mut self.left,
            Side::Right => &mut self.right,
        }
    }

    /// Moves the paddle owned by `input.id` and clamps it into range.
    ///
    /// Inputs for ids that own no paddle are dropped without a trace. Deltas
    /// are trusted at face value; only NaN is ignored since it would escape
    /// the clamp.
    pub fn apply_input(&mut self, input: &PaddleInput) {
        let Some(side) = Side::from_player_id(input.id) else {
            return;
        };
        if input.dy.is_nan() {
            return;
        }

        let paddle = self.paddle_mut(side);
        paddle.y = clamp_paddle_y(paddle.y + input.dy);
    }

    /// Advances the ball by `dt` seconds and resolves walls, paddles and goals.
    pub fn step(&mut self, dt: f32) {
        let left_y = self.left.y;
        let right_y = self.right.y;
        let ball = &mut self.ball;

        ball.x += ball.vx * dt;
        ball.y += ball.vy * dt;

        // Direction is forced rather than negated so a ball still outside the
        // wall on the next tick cannot flip back out.
        if ball.y < 0.0 {
            ball.vy = ball.vy.abs();
        } else if ball.y > FIELD_HEIGHT {
            ball.vy = -ball.vy.abs();
        }

        if ball.x < PADDLE_HIT_X_LEFT && (ball.y - left_y).abs() < PADDLE_HIT_RANGE {
            ball.vx = ball.vx.abs();
        }
        if ball.x > PADDLE_HIT_X_RIGHT && (ball.y - right_y).abs() < PADDLE_HIT_RANGE {
            ball.vx = -ball.vx.abs();
        }

        if ball.x < 0.0 || ball.x > FIELD_WIDTH {
            ball.x = START_BALL_X;
            ball.y = START_BALL_Y;
            ball.vx = -ball.vx;
        }
    }
}

impl Default for GameState {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{PADDLE_MAX_Y, PADDLE_MIN_Y};
    use assert_approx_eq::assert_approx_eq;
    use proptest::prelude::*;

    fn state_with_ball(x: f32, y: f32, vx: f32, vy: f32) -> GameState {
        let mut state = GameState::new();
        state.ball = BallState { x, y, vx, vy };
        state
    }

    fn bits(state: &GameState) -> [u32; 8] {
        [
            state.left.id,
            state.left.y.to_bits(),
            state.right.id,
            state.right.y.to_bits(),
            state.ball.x.to_bits(),
            state.ball.y.to_bits(),
            state.ball.vx.to_bits(),
            state.ball.vy.to_bits(),
        ]
    }

    #[test]
    fn test_initial_state() {
        let state = GameState::new();
        assert_eq!(state.left.id, 1);
        assert_eq!(state.right.id, 2);
        assert_eq!(state.left.y, 540.0);
        assert_eq!(state.right.y, 540.0);
        assert_eq!(
            state.ball,
            BallState {
                x: 960.0,
                y: 540.0,
                vx: 350.0,
                vy: 220.0
            }
        );
    }

    #[test]
    fn test_side_from_player_id() {
        assert_eq!(Side::from_player_id(1), Some(Side::Left));
        assert_eq!(Side::from_player_id(2), Some(Side::Right));
        assert_eq!(Side::from_player_id(0), None);
        assert_eq!(Side::from_player_id(3), None);
    }

    #[test]
    fn test_apply_input_moves_paddle() {
        let mut state = GameState::new();
        state.apply_input(&PaddleInput { id: 1, dy: -50.0 });
        state.apply_input(&PaddleInput { id: 2, dy: 30.0 });

        assert_eq!(state.left.y, 490.0);
        assert_eq!(state.right.y, 570.0);
    }

    #[test]
    fn test_apply_input_clamps() {
        let mut state = GameState::new();
        state.apply_input(&PaddleInput {
            id: 1,
            dy: -10_000.0,
        });
        state.apply_input(&PaddleInput { id: 2, dy: 10_000.0 });

        assert_eq!(state.left.y, PADDLE_MIN_Y);
        assert_eq!(state.right.y, PADDLE_MAX_Y);

        state.apply_input(&PaddleInput {
            id: 1,
            dy: f32::NEG_INFINITY,
        });
        assert_eq!(state.left.y, PADDLE_MIN_Y);
    }

    #[test]
    fn test_unknown_id_is_noop() {
        let mut state = GameState::new();
        let before = bits(&state);

        state.apply_input(&PaddleInput { id: 99, dy: 123.0 });
        state.apply_input(&PaddleInput { id: 0, dy: -7.5 });

        assert_eq!(bits(&state), before);
    }

    #[test]
    fn test_nan_delta_is_ignored() {
        let mut state = GameState::new();
        state.apply_input(&PaddleInput {
            id: 2,
            dy: f32::NAN,
        });
        assert_eq!(state.right.y, 540.0);
    }

    #[test]
    fn test_step_integrates_position() {
        let mut state = state_with_ball(960.0, 540.0, 350.0, 220.0);
        state.step(0.5);

        assert_approx_eq!(state.ball.x, 1135.0, 0.001);
        assert_approx_eq!(state.ball.y, 650.0, 0.001);
        assert_eq!(state.ball.vx, 350.0);
        assert_eq!(state.ball.vy, 220.0);
    }

    #[test]
    fn test_bottom_wall_bounce() {
        let mut state = state_with_ball(960.0, 1075.0, 0.0, 200.0);
        state.step(0.1);

        assert!(state.ball.y > 1080.0);
        assert_eq!(state.ball.vy, -200.0);
    }

    #[test]
    fn test_top_wall_bounce() {
        let mut state = state_with_ball(960.0, 5.0, 0.0, -200.0);
        state.step(0.1);

        assert!(state.ball.y < 0.0);
        assert_eq!(state.ball.vy, 200.0);
    }

    #[test]
    fn test_wall_bounce_flips_once_per_crossing() {
        // Overshoot far enough that the ball is still past the wall next tick.
        let mut state = state_with_ball(960.0, 1070.0, 0.0, 400.0);
        state.step(0.1);
        assert!(state.ball.y > 1080.0);
        assert_eq!(state.ball.vy, -400.0);

        state.ball.y = 1090.0;
        state.step(0.01);
        assert!(state.ball.y > 1080.0);
        assert_eq!(state.ball.vy, -400.0);
    }

    #[test]
    fn test_left_paddle_returns_ball() {
        let mut state = state_with_ball(58.0, 540.0, -300.0, 0.0);
        state.step(0.001);

        assert!(state.ball.vx > 0.0);
        assert_eq!(state.ball.vx, 300.0);
    }

    #[test]
    fn test_right_paddle_returns_ball() {
        let mut state = state_with_ball(1862.0, 600.0, 300.0, 0.0);
        state.step(0.001);

        assert!(state.ball.vx < 0.0);
        assert_eq!(state.ball.vx, -300.0);
    }

    #[test]
    fn test_paddle_correction_is_one_sided() {
        // Already moving away from the left paddle: direction is kept.
        let mut state = state_with_ball(50.0, 540.0, 300.0, 0.0);
        state.step(0.001);
        assert_eq!(state.ball.vx, 300.0);
    }

    #[test]
    fn test_paddle_miss_outside_range() {
        let mut state = state_with_ball(58.0, 540.0 + 95.0, -300.0, 0.0);
        state.step(0.001);
        assert_eq!(state.ball.vx, -300.0);
    }

    #[test]
    fn test_paddle_hit_range_is_exclusive() {
        let mut state = state_with_ball(58.0, 630.0, -300.0, 0.0);
        state.step(0.0);
        assert_eq!(state.ball.vx, -300.0);
    }

    #[test]
    fn test_goal_resets_ball() {
        let mut state = state_with_ball(1915.0, 100.0, 300.0, 50.0);
        state.step(0.1);

        assert_eq!(state.ball.x, 960.0);
        assert_eq!(state.ball.y, 540.0);
        assert_eq!(state.ball.vx, -300.0);
        assert_eq!(state.ball.vy, 50.0);
    }

    #[test]
    fn test_goal_on_left_serves_right() {
        let mut state = state_with_ball(5.0, 900.0, -300.0, 0.0);
        state.step(0.1);

        assert_eq!(state.ball.x, 960.0);
        assert_eq!(state.ball.y, 540.0);
        assert_eq!(state.ball.vx, 300.0);
    }

    #[test]
    fn test_scenario_input_then_one_second_tick() {
        let mut state = GameState::new();
        state.apply_input(&PaddleInput { id: 1, dy: -50.0 });
        assert_eq!(state.left.y, 490.0);

        state.step(1.0);

        assert_approx_eq!(state.ball.x, 1310.0, 0.001);
        assert_approx_eq!(state.ball.y, 760.0, 0.001);
        assert_eq!(state.ball.vx, 350.0);
        assert_eq!(state.ball.vy, 220.0);
        assert_eq!(state.left.y, 490.0);
        assert_eq!(state.right.y, 540.0);
    }

    proptest! {
        #[test]
        fn prop_paddles_stay_in_range(
            inputs in prop::collection::vec((0u32..4, any::<f32>()), 0..64)
        ) {
            let mut state = GameState::new();
            for (id, dy) in inputs {
                state.apply_input(&PaddleInput { id, dy });
                prop_assert!(state.left.y >= PADDLE_MIN_Y && state.left.y <= PADDLE_MAX_Y);
                prop_assert!(state.right.y >= PADDLE_MIN_Y && state.right.y <= PADDLE_MAX_Y);
            }
        }

        #[test]
        fn prop_ball_stays_on_field(
            steps in prop::collection::vec(0.0f32..0.05, 1..200)
        ) {
            let mut state = GameState::new();
            for dt in steps {
                state.step(dt);
                prop_assert!(state.ball.x >= 0.0 && state.ball.x <= 1920.0);
                // One tick of overshoot past a wall is allowed.
                prop_assert!(state.ball.y >= -20.0 && state.ball.y <= 1100.0);
            }
        }
    }
}
