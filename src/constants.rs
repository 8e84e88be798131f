//! Stable application-wide constants.
//!
//! Values here are structural invariants and algorithm coefficients that
//! should rarely change. Quality-critical tuning knobs that benefit from
//! runtime experimentation live in
//! [`RouteEngineConfig`](crate::config::RouteEngineConfig) instead.

// --- Server defaults (used when HOST / PORT env vars are absent) ---

/// Default bind address for the HTTP server.
pub const DEFAULT_HOST: &str = "0.0.0.0";
/// Default port for the HTTP server.
pub const DEFAULT_PORT: &str = "3000";

// --- Cache defaults ---

/// Default route cache TTL: 1 hour. Overridden by `ROUTE_CACHE_TTL`.
pub const DEFAULT_ROUTE_CACHE_TTL_SECONDS: u64 = 3_600;
/// Maximum entries for the in-memory route cache (LRU eviction).
pub const DEFAULT_MEMORY_CACHE_MAX_ENTRIES: u64 = 1_000;

// --- Geometry ---

/// Mean Earth radius used by haversine distance and spherical projection.
pub const EARTH_RADIUS_KM: f64 = 6371.0;

// --- Circuit metrics ---

/// Grid cell size (degrees) for backtrack edge discretization, ~33m.
pub const BACKTRACK_GRID_CELL_DEG: f64 = 3e-4;
/// Grid cell size (degrees) for overlap/popularity edge discretization, ~55m.
pub const OVERLAP_GRID_CELL_DEG: f64 = 5e-4;
/// Angular sector width (degrees) for compass coverage bucketing.
pub const ANGULAR_SECTOR_DEG: f64 = 30.0;
/// A turn within this many degrees of a full reversal counts as a dead end.
pub const DEAD_END_TOLERANCE_DEG: f64 = 15.0;

// --- Composite circuit score weights ---

/// Weight of (1 - backtrack ratio) in the composite circuit score.
pub const SCORE_WEIGHT_BACKTRACK: f64 = 0.4;
/// Weight of normalized angular spread in the composite circuit score.
pub const SCORE_WEIGHT_ANGULAR: f64 = 0.4;
/// Weight of the dead-end penalty term in the composite circuit score.
pub const SCORE_WEIGHT_DEAD_ENDS: f64 = 0.2;
/// Composite-score penalty per dead end.
pub const DEAD_END_PENALTY: f64 = 0.5;

// --- Seed-strategy ranking weights ---

pub const SEED_RANK_WEIGHT_QUALITY: f64 = 0.4;
pub const SEED_RANK_WEIGHT_POPULARITY: f64 = 0.25;
pub const SEED_RANK_WEIGHT_LOOP: f64 = 0.2;
pub const SEED_RANK_WEIGHT_BACKTRACK: f64 = 0.15;
/// Terrain blend weight applied on top of the base rank when the caller
/// prefers trails.
pub const SEED_RANK_TERRAIN_BLEND: f64 = 0.2;
/// Popularity returned when no historical data exists for a route's edges.
pub const NEUTRAL_POPULARITY: f64 = 0.5;
/// Loop-closure distance (km) at which loop quality reaches zero.
pub const LOOP_QUALITY_ZERO_DISTANCE_KM: f64 = 0.5;

// --- Terrain analysis ---

/// Highway fraction above which a route is flagged as having major roads.
pub const HIGHWAY_FRACTION_THRESHOLD: f64 = 0.1;

// --- Elevation profile ---

/// Maximum points sampled along a path for one elevation lookup.
pub const ELEVATION_MAX_SAMPLES: usize = 50;
/// Gradient computation ignores adjacent samples closer than this (meters)
/// to avoid divide-by-noise on near-duplicate points.
pub const GRADIENT_MIN_HORIZONTAL_M: f64 = 5.0;

// --- Difficulty ladder thresholds ---

/// Backtrack ratio above which a route is no longer rated easy.
pub const DIFFICULTY_EASY_MAX_BACKTRACK: f64 = 0.25;
/// Elevation gain (meters) above which a route is at least moderate.
pub const DIFFICULTY_MODERATE_GAIN_M: f64 = 100.0;
/// Elevation gain (meters) above which a route is rated hard.
pub const DIFFICULTY_HARD_GAIN_M: f64 = 200.0;

// --- Template geometry ---

/// Base radius divisor: scale-1.0 radius is target distance / 4.
pub const BASE_RADIUS_DIVISOR: f64 = 4.0;
