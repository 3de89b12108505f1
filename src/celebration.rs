use rand::seq::SliceRandom;
use rand::Rng;
use std::time::{Duration, Instant};

const PAW_SYMBOLS: [char; 5] = ['🐾', '✨', '🐟', '⭐', '♥'];
const CHEERS: [&str; 5] = ["MEOW!", "PURRFECT!", "NYA~", "DONE!", "GOOD KITTY!"];

/// How long the mascot spins after a session completes
pub const SPIN_DURATION: Duration = Duration::from_secs(1);
const SPIN_FRAMES: usize = 4;

/// Particle for the completion animation
#[derive(Debug, Clone)]
pub struct PawParticle {
    pub x: f64,
    pub y: f64,
    pub vel_x: f64,
    pub vel_y: f64,
    pub symbol: char,
    pub color_index: usize,
    pub age: f64,
    pub max_age: f64,
    /// Letters of the cheer glide to a fixed spot and hold there
    pub target: Option<(f64, f64)>,
}

impl PawParticle {
    fn scatter<R: Rng + ?Sized>(x: f64, y: f64, rng: &mut R) -> Self {
        Self {
            x,
            y,
            vel_x: rng.gen_range(-3.0..3.0),
            vel_y: rng.gen_range(-4.0..-1.0),
            symbol: *PAW_SYMBOLS.choose(rng).unwrap_or(&'🐾'),
            color_index: rng.gen_range(0..7),
            age: 0.0,
            max_age: rng.gen_range(2.0..4.0),
            target: None,
        }
    }

    fn letter<R: Rng + ?Sized>(
        from: (f64, f64),
        to: (f64, f64),
        symbol: char,
        rng: &mut R,
    ) -> Self {
        Self {
            x: from.0,
            y: from.1,
            vel_x: to.0 - from.0,
            vel_y: to.1 - from.1,
            symbol,
            color_index: rng.gen_range(0..7),
            age: 0.0,
            max_age: rng.gen_range(3.0..5.0),
            target: Some(to),
        }
    }

    pub fn is_letter(&self) -> bool {
        self.target.is_some()
    }

    fn update(&mut self, dt: f64) -> bool {
        match self.target {
            Some((tx, ty)) => {
                let dist = ((tx - self.x).powi(2) + (ty - self.y).powi(2)).sqrt();
                if dist > 1.0 {
                    self.x += self.vel_x * dt;
                    self.y += self.vel_y * dt;
                    self.vel_x *= 0.95;
                    self.vel_y *= 0.95;
                } else {
                    self.x = tx;
                    self.y = ty;
                    self.vel_x = 0.0;
                    self.vel_y = 0.0;
                }
            }
            None => {
                self.x += self.vel_x * dt;
                self.y += self.vel_y * dt;
                self.vel_y += 15.0 * dt;
            }
        }

        self.age += dt;
        self.age < self.max_age
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MascotPose {
    Sitting,
    Spinning(usize),
}

/// Completion celebration: a spinning mascot and a burst of paw prints
#[derive(Debug)]
pub struct Celebration {
    pub particles: Vec<PawParticle>,
    started_at: Instant,
    duration: Duration,
    is_active: bool,
    width: f64,
    height: f64,
}

impl Celebration {
    pub fn new() -> Self {
        Self {
            particles: Vec::new(),
            started_at: Instant::now(),
            duration: Duration::from_secs(3),
            is_active: false,
            width: 80.0,
            height: 24.0,
        }
    }

    pub fn is_active(&self) -> bool {
        self.is_active
    }

    pub fn start(&mut self, width: u16, height: u16) {
        let mut rng = rand::thread_rng();

        self.particles.clear();
        self.started_at = Instant::now();
        self.is_active = true;
        self.width = f64::from(width);
        self.height = f64::from(height);

        let center = (self.width / 2.0, self.height / 2.0);
        let cheer = CHEERS.choose(&mut rng).unwrap_or(&"MEOW!");
        self.spell(cheer, center, &mut rng);

        for _ in 0..25 {
            let x = center.0 + rng.gen_range(-15.0..15.0);
            let y = center.1 + rng.gen_range(-8.0..8.0);
            self.particles.push(PawParticle::scatter(x, y, &mut rng));
        }
    }

    fn spell<R: Rng + ?Sized>(&mut self, text: &str, center: (f64, f64), rng: &mut R) {
        let spacing = 2.0;
        let left = center.0 - (text.chars().count() as f64 - 1.0) * spacing / 2.0;

        for (i, ch) in text.chars().enumerate() {
            if ch == ' ' {
                continue;
            }
            let to = (left + i as f64 * spacing, center.1 - 2.0);
            let from = (
                center.0 + rng.gen_range(-10.0..10.0),
                center.1 + rng.gen_range(-5.0..5.0),
            );
            self.particles.push(PawParticle::letter(from, to, ch, rng));
        }
    }

    /// Advance by `dt` seconds; ends the celebration once it has run its course.
    pub fn update(&mut self, dt: f64) {
        if !self.is_active {
            return;
        }

        if self.started_at.elapsed() >= self.duration {
            self.is_active = false;
            self.particles.clear();
            return;
        }

        let (width, height) = (self.width, self.height);
        self.particles.retain_mut(|p| {
            let alive = p.update(dt);
            if p.is_letter() {
                return alive;
            }
            let margin = 5.0;
            let off_screen = p.y > height + margin || p.x < -margin || p.x > width + margin;
            alive && !off_screen
        });
    }

    pub fn pose(&self) -> MascotPose {
        self.pose_at(self.started_at.elapsed())
    }

    fn pose_at(&self, elapsed: Duration) -> MascotPose {
        if !self.is_active || elapsed >= SPIN_DURATION {
            return MascotPose::Sitting;
        }
        let frame_len = SPIN_DURATION.as_secs_f64() / SPIN_FRAMES as f64;
        let frame = (elapsed.as_secs_f64() / frame_len) as usize;
        MascotPose::Spinning(frame.min(SPIN_FRAMES - 1))
    }
}

impl Default for Celebration {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::{rngs::StdRng, SeedableRng};

    #[test]
    fn scattered_paws_fall() {
        let mut rng = StdRng::seed_from_u64(11);
        let mut paw = PawParticle::scatter(10.0, 10.0, &mut rng);
        let initial_vel_y = paw.vel_y;

        assert!(paw.update(0.1));
        assert!(paw.vel_y > initial_vel_y);
        assert!(!paw.is_letter());
    }

    #[test]
    fn letters_settle_on_target() {
        let mut rng = StdRng::seed_from_u64(5);
        let mut letter = PawParticle::letter((0.0, 0.0), (10.0, 5.0), 'M', &mut rng);
        assert!(letter.is_letter());

        for _ in 0..10 {
            letter.update(0.1);
        }

        let dist = ((10.0 - letter.x).powi(2) + (5.0 - letter.y).powi(2)).sqrt();
        assert!(dist < 5.0);
    }

    #[test]
    fn inactive_until_started() {
        let celebration = Celebration::new();
        assert!(!celebration.is_active());
        assert!(celebration.particles.is_empty());
        assert_eq!(celebration.pose(), MascotPose::Sitting);
    }

    #[test]
    fn start_spells_a_cheer_among_paws() {
        let mut celebration = Celebration::new();
        for _ in 0..10 {
            celebration.start(80, 24);
            assert!(celebration.is_active());
            assert!(celebration.particles.iter().any(|p| p.is_letter()));
            assert!(celebration.particles.iter().any(|p| !p.is_letter()));
        }
    }

    #[test]
    fn mascot_spins_for_one_second() {
        let mut celebration = Celebration::new();
        celebration.start(80, 24);

        assert_eq!(celebration.pose_at(Duration::ZERO), MascotPose::Spinning(0));
        assert_eq!(
            celebration.pose_at(Duration::from_millis(999)),
            MascotPose::Spinning(SPIN_FRAMES - 1)
        );
        assert_eq!(
            celebration.pose_at(Duration::from_millis(1000)),
            MascotPose::Sitting
        );
    }

    #[test]
    fn off_screen_paws_are_dropped() {
        let mut celebration = Celebration::new();
        celebration.start(20, 10);
        let mut rng = StdRng::seed_from_u64(1);
        celebration
            .particles
            .push(PawParticle::scatter(100.0, 100.0, &mut rng));

        celebration.update(0.1);

        for p in celebration.particles.iter().filter(|p| !p.is_letter()) {
            assert!(p.y <= 15.0 && p.x >= -5.0 && p.x <= 25.0);
        }
    }
}
