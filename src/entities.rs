//! Entity types and fixed-capacity pools.
//!
//! Plain data only.  The lock domains that guard these types live in
//! [`crate::session`].

// ── Capacities & sprites ──────────────────────────────────────────────────────

pub const MAX_BULLETS: usize = 64;
pub const MAX_ENEMIES: usize = 32;

pub const SHIP_W: i32 = 7;
pub const SHIP_H: i32 = 1;
pub const ENEMY_W: i32 = 5;
pub const ENEMY_H: i32 = 2;

/// Player bullets at or above this row are gone.
pub const CEILING: f32 = 1.0;

/// Round a world coordinate to the cell it occupies.
#[inline]
pub fn cell(v: f32) -> i32 {
    v.round() as i32
}

// ── Pools ─────────────────────────────────────────────────────────────────────

/// A pool entry that is either in play or a free slot.
pub trait Slot: Copy + Default {
    fn in_play(&self) -> bool;
    fn vacate(&mut self);
}

#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct Bullet {
    pub x: f32,
    pub y: f32,
    pub active: bool,
}

impl Bullet {
    pub fn at(x: f32, y: f32) -> Self {
        Self { x, y, active: true }
    }

    pub fn cell(&self) -> (i32, i32) {
        (cell(self.x), cell(self.y))
    }
}

impl Slot for Bullet {
    fn in_play(&self) -> bool {
        self.active
    }

    fn vacate(&mut self) {
        self.active = false;
    }
}

#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct Enemy {
    pub x: f32,
    pub y: f32,
    pub alive: bool,
    /// Formation row, top row is 0.
    pub row: u32,
}

impl Enemy {
    pub fn cell(&self) -> (i32, i32) {
        (cell(self.x), cell(self.y))
    }
}

impl Slot for Enemy {
    fn in_play(&self) -> bool {
        self.alive
    }

    fn vacate(&mut self) {
        self.alive = false;
    }
}

/// Fixed-capacity array of slots.  Never grows; a spawn into a full pool is
/// dropped.
#[derive(Clone, Debug)]
pub struct Pool<T, const N: usize> {
    slots: [T; N],
}

impl<T: Slot, const N: usize> Default for Pool<T, N> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T: Slot, const N: usize> Pool<T, N> {
    pub fn new() -> Self {
        Self {
            slots: [T::default(); N],
        }
    }

    pub const fn capacity(&self) -> usize {
        N
    }

    /// Put `item` into the first free slot.  Returns the slot index, or
    /// `None` when the pool is full.
    pub fn spawn(&mut self, item: T) -> Option<usize> {
        let index = self.slots.iter().position(|s| !s.in_play())?;
        self.slots[index] = item;
        Some(index)
    }

    pub fn retire(&mut self, index: usize) {
        if let Some(slot) = self.slots.get_mut(index) {
            slot.vacate();
        }
    }

    /// Free every slot and forget stale positions.
    pub fn clear(&mut self) {
        self.slots = [T::default(); N];
    }

    pub fn get(&self, index: usize) -> Option<&T> {
        self.slots.get(index)
    }

    pub fn slots_mut(&mut self) -> &mut [T] {
        &mut self.slots
    }

    /// Entries in play, in slot order.
    pub fn live(&self) -> impl Iterator<Item = &T> {
        self.slots.iter().filter(|s| s.in_play())
    }

    pub fn live_mut(&mut self) -> impl Iterator<Item = &mut T> {
        self.slots.iter_mut().filter(|s| s.in_play())
    }

    pub fn live_count(&self) -> usize {
        self.live().count()
    }

    pub fn is_empty(&self) -> bool {
        self.live().next().is_none()
    }
}

/// Bullet lock domain: both bullet pools.
#[derive(Clone, Debug, Default)]
pub struct BulletPools {
    pub player: Pool<Bullet, MAX_BULLETS>,
    pub enemy: Pool<Bullet, MAX_BULLETS>,
}

impl BulletPools {
    pub fn clear(&mut self) {
        self.player.clear();
        self.enemy.clear();
    }
}

/// Enemy lock domain: the formation.
#[derive(Clone, Debug, Default)]
pub struct Squadron {
    pub pool: Pool<Enemy, MAX_ENEMIES>,
}

impl Squadron {
    /// Replace the pool with a fresh `rows × cols` formation spread across the
    /// arena.  Enemies past `MAX_ENEMIES` are not placed.
    pub fn deploy(&mut self, arena: &Arena, rows: u32, cols: u32) {
        self.pool.clear();
        let cols = cols.max(1);
        let spacing = (arena.width - 4) as f32 / cols as f32;
        let mut placed = 0;
        'outer: for r in 0..rows {
            for c in 0..cols {
                if placed == MAX_ENEMIES {
                    break 'outer;
                }
                let _ = self.pool.spawn(Enemy {
                    x: 2.0 + c as f32 * spacing,
                    y: (2 + r as i32 * (ENEMY_H + 1)) as f32,
                    alive: true,
                    row: r,
                });
                placed += 1;
            }
        }
    }

    pub fn living(&self) -> impl Iterator<Item = &Enemy> {
        self.pool.live()
    }

    pub fn any_alive(&self) -> bool {
        !self.pool.is_empty()
    }

    /// Largest y among living enemies.
    pub fn lowest_y(&self) -> Option<f32> {
        self.living().map(|e| e.y).reduce(f32::max)
    }
}

/// Score lock domain.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct ScoreBoard {
    pub points: u32,
}

// ── Ship & game scalars ──────────────────────────────────────────────────────

/// The player ship.  `x` is always `round(fx)`; both change only through
/// [`Ship::place`] and [`Ship::steer`].
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Ship {
    fx: f32,
    x: i32,
    y: i32,
}

impl Ship {
    pub fn new(fx: f32, y: i32) -> Self {
        Self { fx, x: cell(fx), y }
    }

    pub fn fx(&self) -> f32 {
        self.fx
    }

    pub fn x(&self) -> i32 {
        self.x
    }

    pub fn y(&self) -> i32 {
        self.y
    }

    /// Move to `fx`, clamped to the arena's inner columns.
    pub fn place(&mut self, fx: f32, arena: &Arena) {
        let (lo, hi) = arena.ship_range();
        self.fx = fx.clamp(lo, hi);
        self.x = cell(self.fx);
    }

    pub fn steer(&mut self, delta: f32, arena: &Arena) {
        self.place(self.fx + delta, arena);
    }

    /// Leftmost and rightmost columns of the hull.
    pub fn hull(&self) -> (i32, i32) {
        let left = self.x - SHIP_W / 2;
        (left, left + SHIP_W - 1)
    }
}

/// Game lock domain: lives, level, end flags, the ship and the damage flash.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Vitals {
    pub lives: u32,
    pub level: u32,
    pub completed: bool,
    pub ship: Ship,
    /// Clock time of the last hit while the damage flash is showing.
    pub flash_started: Option<std::time::Duration>,
}

impl Vitals {
    pub fn new(lives: u32, arena: &Arena) -> Self {
        Self {
            lives,
            level: 1,
            completed: false,
            ship: Ship::new(arena.ship_home(), arena.ship_row()),
            flash_started: None,
        }
    }

    pub fn hit_flash_active(&self) -> bool {
        self.flash_started.is_some()
    }
}

// ── Arena ─────────────────────────────────────────────────────────────────────

/// Playfield size in terminal cells, fixed for a session.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Arena {
    pub width: i32,
    pub height: i32,
}

impl Arena {
    pub fn new(width: u16, height: u16) -> Self {
        Self {
            width: i32::from(width),
            height: i32::from(height),
        }
    }

    pub fn ship_row(&self) -> i32 {
        (self.height - SHIP_H - 1).max(3)
    }

    pub fn ship_home(&self) -> f32 {
        self.width as f32 / 2.0
    }

    pub fn ship_range(&self) -> (f32, f32) {
        let hi = (self.width - 2).max(1) as f32;
        (1.0, hi)
    }

    /// The formation stops stepping down once its bottom edge would pass
    /// this row.
    pub fn descent_limit(&self) -> i32 {
        (self.height / 2 - ENEMY_H).max(2)
    }

    /// Would a sprite of `width` starting at column `left` touch a wall?
    pub fn hits_wall(&self, left: i32, width: i32) -> bool {
        left < 1 || left + width - 1 > self.width - 2
    }
}

// ── Snapshot ──────────────────────────────────────────────────────────────────

/// Read-only copy of everything a frame needs, taken under every lock domain
/// at once.
#[derive(Clone, Debug, PartialEq)]
pub struct Snapshot {
    pub width: i32,
    pub height: i32,
    pub score: u32,
    pub lives: u32,
    pub level: u32,
    pub completed: bool,
    pub ship_x: i32,
    pub ship_y: i32,
    pub hit_flash: bool,
    pub player_bullets: Vec<(i32, i32)>,
    pub enemy_bullets: Vec<(i32, i32)>,
    pub enemies: Vec<(i32, i32)>,
}

impl Snapshot {
    pub fn capture(
        arena: &Arena,
        bullets: &BulletPools,
        squadron: &Squadron,
        score: &ScoreBoard,
        vitals: &Vitals,
    ) -> Self {
        Self {
            width: arena.width,
            height: arena.height,
            score: score.points,
            lives: vitals.lives,
            level: vitals.level,
            completed: vitals.completed,
            ship_x: vitals.ship.x(),
            ship_y: vitals.ship.y(),
            hit_flash: vitals.hit_flash_active(),
            player_bullets: bullets.player.live().map(Bullet::cell).collect(),
            enemy_bullets: bullets.enemy.live().map(Bullet::cell).collect(),
            enemies: squadron.living().map(Enemy::cell).collect(),
        }
    }
}
