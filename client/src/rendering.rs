use macroquad::prelude::*;
use shared::{
    GameState, Side, BALL_RADIUS, FIELD_HEIGHT, FIELD_WIDTH, LEFT_PADDLE_X, PADDLE_HEIGHT,
    PADDLE_WIDTH, RIGHT_PADDLE_X,
};

/// Placement of the 16:9 playfield inside the window, bars filling the rest.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Viewport {
    pub offset_x: f32,
    pub offset_y: f32,
    pub scale: f32,
}

impl Viewport {
    pub fn fit(screen_width: f32, screen_height: f32) -> Self {
        let scale = (screen_width / FIELD_WIDTH).min(screen_height / FIELD_HEIGHT);

        Self {
            offset_x: (screen_width - FIELD_WIDTH * scale) / 2.0,
            offset_y: (screen_height - FIELD_HEIGHT * scale) / 2.0,
            scale,
        }
    }

    /// Converts field coordinates to window pixels.
    pub fn to_screen(&self, x: f32, y: f32) -> (f32, f32) {
        (self.offset_x + x * self.scale, self.offset_y + y * self.scale)
    }
}

pub struct Renderer {
    local_side: Side,
}

impl Renderer {
    pub fn new(local_side: Side) -> Self {
        Renderer { local_side }
    }

    pub fn render(&self, state: &GameState) {
        clear_background(BLACK);

        let viewport = Viewport::fit(screen_width(), screen_height());
        self.draw_field(&viewport);

        for side in [Side::Left, Side::Right] {
            let color = if side == self.local_side {
                GREEN
            } else {
                Color::from_rgba(255, 68, 68, 255)
            };
            self.draw_paddle(&viewport, side, state.paddle(side).y, color);
        }

        let (bx, by) = viewport.to_screen(state.ball.x, state.ball.y);
        draw_circle(bx, by, BALL_RADIUS * viewport.scale, WHITE);
    }

    fn draw_field(&self, viewport: &Viewport) {
        let (x, y) = viewport.to_screen(0.0, 0.0);
        draw_rectangle(
            x,
            y,
            FIELD_WIDTH * viewport.scale,
            FIELD_HEIGHT * viewport.scale,
            Color::from_rgba(26, 26, 26, 255),
        );

        let (mid_x, _) = viewport.to_screen(FIELD_WIDTH / 2.0, 0.0);
        draw_line(
            mid_x,
            y,
            mid_x,
            y + FIELD_HEIGHT * viewport.scale,
            2.0,
            Color::from_rgba(68, 68, 68, 255),
        );
    }

    fn draw_paddle(&self, viewport: &Viewport, side: Side, center_y: f32, color: Color) {
        let center_x = match side {
            Side::Left => LEFT_PADDLE_X,
            Side::Right => RIGHT_PADDLE_X,
        };
        let (x, y) = viewport.to_screen(
            center_x - PADDLE_WIDTH / 2.0,
            center_y - PADDLE_HEIGHT / 2.0,
        );

        draw_rectangle(
            x,
            y,
            PADDLE_WIDTH * viewport.scale,
            PADDLE_HEIGHT * viewport.scale,
            color,
        );
    }
}
