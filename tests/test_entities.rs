use galaga::entities::*;

fn arena() -> Arena {
    Arena::new(80, 24)
}

// ── Pools ─────────────────────────────────────────────────────────────────────

#[test]
fn spawn_claims_first_free_slot() {
    let mut pool: Pool<Bullet, 4> = Pool::new();
    assert_eq!(pool.spawn(Bullet::at(1.0, 1.0)), Some(0));
    assert_eq!(pool.spawn(Bullet::at(2.0, 2.0)), Some(1));
    pool.retire(0);
    assert_eq!(pool.spawn(Bullet::at(3.0, 3.0)), Some(0));
    assert_eq!(pool.get(0).map(|b| b.x), Some(3.0));
}

#[test]
fn spawn_into_full_pool_is_dropped() {
    let mut pool: Pool<Bullet, 4> = Pool::new();
    for i in 0..10 {
        let _ = pool.spawn(Bullet::at(i as f32, 5.0));
        assert!(pool.live_count() <= pool.capacity());
    }
    assert_eq!(pool.live_count(), 4);
    assert_eq!(pool.spawn(Bullet::at(0.0, 0.0)), None);
}

#[test]
fn inactive_slots_are_invisible() {
    let mut pool: Pool<Bullet, 4> = Pool::new();
    let _ = pool.spawn(Bullet::at(1.0, 1.0));
    let _ = pool.spawn(Bullet::at(2.0, 2.0));
    pool.retire(0);
    let live: Vec<_> = pool.live().map(|b| b.x).collect();
    assert_eq!(live, vec![2.0]);
}

#[test]
fn retire_out_of_range_is_a_no_op() {
    let mut pool: Pool<Bullet, 2> = Pool::new();
    let _ = pool.spawn(Bullet::at(1.0, 1.0));
    pool.retire(99);
    assert_eq!(pool.live_count(), 1);
}

#[test]
fn clear_frees_every_slot() {
    let mut pools = BulletPools::default();
    for _ in 0..5 {
        let _ = pools.player.spawn(Bullet::at(3.0, 3.0));
        let _ = pools.enemy.spawn(Bullet::at(4.0, 4.0));
    }
    pools.clear();
    assert!(pools.player.is_empty());
    assert!(pools.enemy.is_empty());
}

// ── Formation ─────────────────────────────────────────────────────────────────

#[test]
fn deploy_places_rows_times_columns() {
    let mut squadron = Squadron::default();
    squadron.deploy(&arena(), 2, 8);
    assert_eq!(squadron.living().count(), 16);

    let first = squadron.pool.get(0).copied().unwrap();
    assert_eq!((first.x, first.y, first.row), (2.0, 2.0, 0));
    let second_row = squadron.pool.get(8).copied().unwrap();
    assert_eq!((second_row.y, second_row.row), (5.0, 1));
}

#[test]
fn deploy_is_capped_at_pool_capacity() {
    let mut squadron = Squadron::default();
    squadron.deploy(&arena(), 6, 8);
    assert_eq!(squadron.living().count(), MAX_ENEMIES);
}

#[test]
fn deploy_replaces_leftovers() {
    let mut squadron = Squadron::default();
    squadron.deploy(&arena(), 4, 8);
    squadron.deploy(&arena(), 2, 8);
    assert_eq!(squadron.living().count(), 16);
}

#[test]
fn lowest_y_ignores_dead_enemies() {
    let mut squadron = Squadron::default();
    squadron.deploy(&arena(), 2, 8);
    for enemy in squadron.pool.slots_mut().iter_mut().skip(8) {
        enemy.alive = false;
    }
    assert_eq!(squadron.lowest_y(), Some(2.0));
}

// ── Ship ──────────────────────────────────────────────────────────────────────

#[test]
fn ship_x_tracks_rounded_fx_after_every_move() {
    let arena = arena();
    let mut ship = Ship::new(arena.ship_home(), arena.ship_row());
    for step in [-1.2, -1.2, 0.7, 2.5, -0.3, 1.2, -100.0, 200.0, -0.5] {
        ship.steer(step, &arena);
        assert_eq!(ship.x(), ship.fx().round() as i32);
        assert!(ship.x() >= 1 && ship.x() <= arena.width - 2);
    }
}

#[test]
fn ship_clamps_to_inner_columns() {
    let arena = arena();
    let mut ship = Ship::new(40.0, arena.ship_row());
    ship.place(-5.0, &arena);
    assert_eq!(ship.x(), 1);
    ship.place(500.0, &arena);
    assert_eq!(ship.x(), 78);
}

#[test]
fn ship_hull_is_centred() {
    let ship = Ship::new(40.0, 22);
    assert_eq!(ship.hull(), (37, 43));
}

// ── Arena ─────────────────────────────────────────────────────────────────────

#[test]
fn arena_geometry() {
    let arena = arena();
    assert_eq!(arena.ship_row(), 22);
    assert_eq!(arena.descent_limit(), 10);
    assert!(arena.hits_wall(0, ENEMY_W));
    assert!(!arena.hits_wall(1, ENEMY_W));
    assert!(!arena.hits_wall(74, ENEMY_W));
    assert!(arena.hits_wall(75, ENEMY_W));
}

#[test]
fn tiny_arena_keeps_ship_on_screen() {
    let arena = Arena::new(10, 3);
    assert_eq!(arena.ship_row(), 3);
    assert_eq!(arena.descent_limit(), 2);
}

// ── Snapshot ──────────────────────────────────────────────────────────────────

#[test]
fn snapshot_lists_only_live_entities() {
    let arena = arena();
    let mut bullets = BulletPools::default();
    let _ = bullets.player.spawn(Bullet::at(10.4, 7.6));
    let _ = bullets.enemy.spawn(Bullet::at(3.0, 3.0));
    bullets.enemy.retire(0);
    let mut squadron = Squadron::default();
    squadron.deploy(&arena, 1, 2);
    squadron.pool.retire(1);
    let vitals = Vitals::new(3, &arena);

    let snap = Snapshot::capture(&arena, &bullets, &squadron, &ScoreBoard { points: 40 }, &vitals);
    assert_eq!(snap.player_bullets, vec![(10, 8)]);
    assert!(snap.enemy_bullets.is_empty());
    assert_eq!(snap.enemies, vec![(2, 2)]);
    assert_eq!(snap.score, 40);
    assert_eq!((snap.ship_x, snap.ship_y), (40, 22));
    assert!(!snap.hit_flash);
}
