use std::time::Duration;

use rand::Rng;
use tracing::debug;
use validator::Validate;

use models::params::session::GameSettings;
use models::schemas::game::{
    BallSchema, PaddleIntent, PaddleSchema, ScoreSchema, SessionStatus, Side, Snapshot,
};

use crate::error::AppError;

pub const FIELD_WIDTH: f32 = 800.0;
pub const FIELD_HEIGHT: f32 = 600.0;
pub const PADDLE_WIDTH: f32 = 10.0;
pub const PADDLE_HEIGHT: f32 = 100.0;
/// Distance from the wall to the paddle's near face.
pub const PADDLE_INSET: f32 = 20.0;
pub const BALL_RADIUS: f32 = 5.0;

/// 60 Hz fixed step.
pub const TICK_INTERVAL: Duration = Duration::from_micros(16_667);

#[derive(Debug, Clone, Copy)]
struct Ball {
    x: f32,
    y: f32,
    vx: f32,
    vy: f32,
}

#[derive(Debug, Clone, Copy)]
struct Paddle {
    y: f32,
    intent: PaddleIntent,
}

impl Paddle {
    fn center(&self) -> f32 {
        self.y + PADDLE_HEIGHT / 2.0
    }
}

/// Authoritative simulation of one match. Pure in-memory; `advance` and
/// `snapshot` never block and are driven from the session's tick task.
pub struct Engine {
    settings: GameSettings,
    ball: Ball,
    left: Paddle,
    right: Paddle,
    score_left: u32,
    score_right: u32,
    status: SessionStatus,
}

impl Engine {
    pub fn new() -> Self {
        let settings = GameSettings::default();
        let mut engine = Self {
            settings,
            ball: Ball {
                x: FIELD_WIDTH / 2.0,
                y: FIELD_HEIGHT / 2.0,
                vx: settings.ball_speed,
                vy: 0.0,
            },
            left: Paddle {
                y: (FIELD_HEIGHT - PADDLE_HEIGHT) / 2.0,
                intent: PaddleIntent::Stop,
            },
            right: Paddle {
                y: (FIELD_HEIGHT - PADDLE_HEIGHT) / 2.0,
                intent: PaddleIntent::Stop,
            },
            score_left: 0,
            score_right: 0,
            status: SessionStatus::Waiting,
        };
        let toward = if rand::rng().random_bool(0.5) {
            Side::Right
        } else {
            Side::Left
        };
        engine.reset_ball(toward);
        engine
    }

    pub fn status(&self) -> SessionStatus {
        self.status
    }

    /// Reconfigure the match. Only accepted while still waiting; once play
    /// has begun the call is a logged no-op.
    pub fn apply_settings(&mut self, settings: &GameSettings) -> Result<(), AppError> {
        settings.validate()?;
        if self.status != SessionStatus::Waiting {
            debug!(status = ?self.status, "session settings ignored after start");
            return Ok(());
        }
        self.settings = *settings;
        let toward = if self.ball.vx >= 0.0 {
            Side::Right
        } else {
            Side::Left
        };
        self.reset_ball(toward);
        Ok(())
    }

    pub fn start(&mut self) -> Result<(), AppError> {
        match self.status {
            SessionStatus::Waiting | SessionStatus::Paused => {
                self.status = SessionStatus::Playing;
                Ok(())
            }
            SessionStatus::Playing => Ok(()),
            SessionStatus::Finished => Err(AppError::conflict("session already finished")),
        }
    }

    pub fn stop(&mut self) {
        if self.status == SessionStatus::Playing {
            self.status = SessionStatus::Paused;
        }
    }

    pub fn apply_intent(&mut self, side: Side, intent: PaddleIntent) {
        match side {
            Side::Left => self.left.intent = intent,
            Side::Right => self.right.intent = intent,
        }
    }

    /// Run one fixed tick: integrate, bounce, score, check the win
    /// threshold. Collision checks run on the post-move position only, so a
    /// ball configured fast enough can cross a paddle in a single tick; a
    /// known limitation of the discrete check, kept as-is.
    pub fn advance(&mut self) {
        if self.status != SessionStatus::Playing {
            return;
        }

        self.ball.x += self.ball.vx;
        self.ball.y += self.ball.vy;

        for paddle in [&mut self.left, &mut self.right] {
            let dy = match paddle.intent {
                PaddleIntent::Up => -self.settings.paddle_speed,
                PaddleIntent::Down => self.settings.paddle_speed,
                PaddleIntent::Stop => 0.0,
            };
            paddle.y = (paddle.y + dy).clamp(0.0, FIELD_HEIGHT - PADDLE_HEIGHT);
        }

        if self.ball.y - BALL_RADIUS <= 0.0 {
            self.ball.y = BALL_RADIUS;
            self.ball.vy = self.ball.vy.abs();
        } else if self.ball.y + BALL_RADIUS >= FIELD_HEIGHT {
            self.ball.y = FIELD_HEIGHT - BALL_RADIUS;
            self.ball.vy = -self.ball.vy.abs();
        }

        if self.ball.vx < 0.0 {
            let leading = self.ball.x - BALL_RADIUS;
            let face = PADDLE_INSET + PADDLE_WIDTH;
            if leading <= face
                && leading >= PADDLE_INSET
                && self.ball.y >= self.left.y
                && self.ball.y <= self.left.y + PADDLE_HEIGHT
            {
                self.ball.vx = self.ball.vx.abs();
                self.ball.vy = self.spin(self.left);
            }
        } else {
            let leading = self.ball.x + BALL_RADIUS;
            let face = FIELD_WIDTH - PADDLE_INSET - PADDLE_WIDTH;
            if leading >= face
                && leading <= FIELD_WIDTH - PADDLE_INSET
                && self.ball.y >= self.right.y
                && self.ball.y <= self.right.y + PADDLE_HEIGHT
            {
                self.ball.vx = -self.ball.vx.abs();
                self.ball.vy = self.spin(self.right);
            }
        }

        if self.ball.x + BALL_RADIUS < 0.0 {
            self.score_right += 1;
            self.reset_ball(Side::Right);
        } else if self.ball.x - BALL_RADIUS > FIELD_WIDTH {
            self.score_left += 1;
            self.reset_ball(Side::Left);
        }

        if self.score_left >= self.settings.win_score || self.score_right >= self.settings.win_score
        {
            self.status = SessionStatus::Finished;
        }
    }

    pub fn snapshot(&self) -> Snapshot {
        Snapshot {
            ball: BallSchema {
                x: self.ball.x,
                y: self.ball.y,
                vx: self.ball.vx,
                vy: self.ball.vy,
            },
            left_paddle: PaddleSchema {
                y: self.left.y,
                intent: self.left.intent,
            },
            right_paddle: PaddleSchema {
                y: self.right.y,
                intent: self.right.intent,
            },
            score: ScoreSchema {
                left: self.score_left,
                right: self.score_right,
            },
            status: self.status,
        }
    }

    /// Vertical velocity proportional to the hit offset from the paddle
    /// center, so edge hits come off at an angle.
    fn spin(&self, paddle: Paddle) -> f32 {
        let offset = (self.ball.y - paddle.center()) / (PADDLE_HEIGHT / 2.0);
        offset * self.settings.ball_speed
    }

    fn reset_ball(&mut self, toward: Side) {
        let mut rng = rand::rng();
        self.ball.x = FIELD_WIDTH / 2.0;
        self.ball.y = FIELD_HEIGHT / 2.0;
        self.ball.vx = match toward {
            Side::Right => self.settings.ball_speed,
            Side::Left => -self.settings.ball_speed,
        };
        self.ball.vy = rng.random_range(-0.5..=0.5) * self.settings.ball_speed;
    }
}

impl Default for Engine {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn playing_engine() -> Engine {
        let mut engine = Engine::new();
        engine.start().unwrap();
        engine
    }

    #[test]
    fn paddles_stay_inside_the_playfield() {
        let mut engine = playing_engine();
        engine.apply_intent(Side::Left, PaddleIntent::Up);
        engine.apply_intent(Side::Right, PaddleIntent::Down);

        for _ in 0..2_000 {
            engine.advance();
            let snapshot = engine.snapshot();
            assert!(snapshot.left_paddle.y >= 0.0);
            assert!(snapshot.left_paddle.y <= FIELD_HEIGHT - PADDLE_HEIGHT);
            assert!(snapshot.right_paddle.y >= 0.0);
            assert!(snapshot.right_paddle.y <= FIELD_HEIGHT - PADDLE_HEIGHT);
        }

        assert_eq!(engine.snapshot().left_paddle.y, 0.0);
        assert_eq!(engine.snapshot().right_paddle.y, FIELD_HEIGHT - PADDLE_HEIGHT);
    }

    #[test]
    fn left_goal_scores_right_and_resets_toward_right() {
        let mut engine = playing_engine();
        // park the paddle out of the ball's path
        engine.left.y = FIELD_HEIGHT - PADDLE_HEIGHT;
        engine.ball = Ball {
            x: -1.0,
            y: 10.0,
            vx: -engine.settings.ball_speed,
            vy: 0.0,
        };

        engine.advance();

        let snapshot = engine.snapshot();
        assert_eq!(snapshot.score.right, 1);
        assert_eq!(snapshot.score.left, 0);
        assert_eq!(snapshot.ball.x, FIELD_WIDTH / 2.0);
        assert_eq!(snapshot.ball.y, FIELD_HEIGHT / 2.0);
        assert!(snapshot.ball.vx > 0.0, "serve direction must flip");
    }

    #[test]
    fn paddle_contact_reflects_and_spins() {
        let mut engine = playing_engine();
        engine.left.y = 200.0;
        // ball arriving into the lower half of the left paddle zone
        engine.ball = Ball {
            x: PADDLE_INSET + PADDLE_WIDTH + BALL_RADIUS + 2.0,
            y: 280.0,
            vx: -engine.settings.ball_speed,
            vy: 0.0,
        };

        engine.advance();

        let snapshot = engine.snapshot();
        assert!(snapshot.ball.vx > 0.0);
        assert!(snapshot.ball.vy > 0.0, "below-center hit must angle down");
    }

    #[test]
    fn reaching_win_score_finishes_and_freezes_the_match() {
        let mut engine = playing_engine();
        engine.score_left = engine.settings.win_score - 1;
        engine.score_right = 3;
        engine.right.y = 0.0;
        engine.ball = Ball {
            x: FIELD_WIDTH + 1.0,
            y: FIELD_HEIGHT - 10.0,
            vx: engine.settings.ball_speed,
            vy: 0.0,
        };

        engine.advance();
        assert_eq!(engine.status(), SessionStatus::Finished);

        let frozen = engine.snapshot();
        engine.advance();
        let after = engine.snapshot();
        assert_eq!(frozen.ball.x, after.ball.x);
        assert_eq!(frozen.ball.y, after.ball.y);
        assert_eq!(frozen.score.left, after.score.left);
        assert_eq!(frozen.score.right, after.score.right);
    }

    #[test]
    fn finished_engine_rejects_start() {
        let mut engine = playing_engine();
        engine.status = SessionStatus::Finished;
        assert!(matches!(engine.start(), Err(AppError::Conflict(_))));
    }

    #[test]
    fn malformed_settings_are_rejected() {
        let mut engine = Engine::new();
        let settings = GameSettings {
            ball_speed: 0.0,
            ..GameSettings::default()
        };
        assert!(matches!(
            engine.apply_settings(&settings),
            Err(AppError::Validation(_))
        ));
    }

    #[test]
    fn settings_are_ignored_once_play_started() {
        let mut engine = playing_engine();
        let settings = GameSettings {
            ball_speed: 12.0,
            ..GameSettings::default()
        };
        engine.apply_settings(&settings).unwrap();
        assert_eq!(engine.settings.ball_speed, GameSettings::default().ball_speed);
    }
}
