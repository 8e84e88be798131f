use crate::constants::*;
use std::env;

#[derive(Debug, Clone)]
pub struct Config {
    pub host: String,
    pub port: u16,
    pub routing_api_key: String,
    /// Override for the routing service base URL (tests, proxies).
    pub routing_base_url: Option<String>,
    pub elevation_base_url: Option<String>,
    pub llm_api_key: Option<String>,
    pub route_cache_ttl: u64,
    pub engine: RouteEngineConfig,
}

#[derive(Debug, Clone)]
pub struct RouteEngineConfig {
    /// How many templates from the catalog are sampled per request.
    pub template_sample_size: usize,

    /// Maximum bisection iterations per template calibration.
    pub calibration_max_iterations: usize,

    /// Relative distance error below which calibration accepts immediately.
    pub calibration_accept_tolerance: f64,

    /// Relative distance error above which the best-seen result is still
    /// discarded and the template reported as failed.
    pub calibration_fail_tolerance: f64,

    /// Lower bound of the calibration scale search interval.
    pub calibration_min_scale: f64,

    /// Upper bound of the calibration scale search interval.
    pub calibration_max_scale: f64,

    /// Backtrack ratio above which a template route is not a genuine circuit.
    pub max_backtrack_ratio: f64,

    /// Minimum angular spread (degrees) for a genuine circuit.
    pub min_angular_spread_deg: f64,

    /// Maximum pairwise path-overlap ratio between returned routes.
    pub max_overlap_ratio: f64,

    /// Number of round-trip seeds sampled by the seed strategy.
    pub seed_sample_count: usize,

    /// Backtrack ratio cutoff for the seed strategy (stricter than templates).
    pub seed_max_backtrack_ratio: f64,

    /// Minimum loop-closure quality for a seed route.
    pub min_loop_quality: f64,

    /// Minimum terrain score when the caller prefers trails.
    pub min_terrain_score: f64,

    /// Bound on concurrent outbound evaluations (routing rate limits).
    pub max_concurrent_requests: usize,

    /// Maximum routes returned per request.
    pub max_alternatives: usize,
}

impl Default for RouteEngineConfig {
    fn default() -> Self {
        Self {
            template_sample_size: 50,
            calibration_max_iterations: 10,
            calibration_accept_tolerance: 0.15,
            calibration_fail_tolerance: 0.25,
            calibration_min_scale: 0.1,
            calibration_max_scale: 5.0,
            max_backtrack_ratio: 0.35,
            min_angular_spread_deg: 180.0,
            max_overlap_ratio: 0.4,
            seed_sample_count: 8,
            seed_max_backtrack_ratio: 0.3,
            min_loop_quality: 0.7,
            min_terrain_score: 0.3,
            max_concurrent_requests: 4,
            max_alternatives: 3,
        }
    }
}

fn env_parsed<T: std::str::FromStr>(key: &str, default: T) -> Result<T, String> {
    match env::var(key) {
        Ok(raw) => raw.parse().map_err(|_| format!("Invalid {}", key)),
        Err(_) => Ok(default),
    }
}

impl RouteEngineConfig {
    pub fn from_env() -> Result<Self, String> {
        let d = Self::default();

        Ok(Self {
            template_sample_size: env_parsed("ROUTE_TEMPLATE_SAMPLE_SIZE", d.template_sample_size)?,
            calibration_max_iterations: env_parsed(
                "ROUTE_CALIBRATION_MAX_ITERATIONS",
                d.calibration_max_iterations,
            )?,
            calibration_accept_tolerance: env_parsed(
                "ROUTE_CALIBRATION_ACCEPT_TOLERANCE",
                d.calibration_accept_tolerance,
            )?,
            calibration_fail_tolerance: env_parsed(
                "ROUTE_CALIBRATION_FAIL_TOLERANCE",
                d.calibration_fail_tolerance,
            )?,
            calibration_min_scale: env_parsed(
                "ROUTE_CALIBRATION_MIN_SCALE",
                d.calibration_min_scale,
            )?,
            calibration_max_scale: env_parsed(
                "ROUTE_CALIBRATION_MAX_SCALE",
                d.calibration_max_scale,
            )?,
            max_backtrack_ratio: env_parsed("ROUTE_MAX_BACKTRACK_RATIO", d.max_backtrack_ratio)?,
            min_angular_spread_deg: env_parsed(
                "ROUTE_MIN_ANGULAR_SPREAD_DEG",
                d.min_angular_spread_deg,
            )?,
            max_overlap_ratio: env_parsed("ROUTE_MAX_OVERLAP_RATIO", d.max_overlap_ratio)?,
            seed_sample_count: env_parsed("ROUTE_SEED_SAMPLE_COUNT", d.seed_sample_count)?,
            seed_max_backtrack_ratio: env_parsed(
                "ROUTE_SEED_MAX_BACKTRACK_RATIO",
                d.seed_max_backtrack_ratio,
            )?,
            min_loop_quality: env_parsed("ROUTE_MIN_LOOP_QUALITY", d.min_loop_quality)?,
            min_terrain_score: env_parsed("ROUTE_MIN_TERRAIN_SCORE", d.min_terrain_score)?,
            max_concurrent_requests: env_parsed(
                "ROUTE_MAX_CONCURRENT_REQUESTS",
                d.max_concurrent_requests,
            )?,
            max_alternatives: env_parsed("ROUTE_MAX_ALTERNATIVES", d.max_alternatives)?,
        })
    }

    pub fn validate(&self) -> Result<(), String> {
        if self.calibration_min_scale <= 0.0
            || self.calibration_min_scale >= self.calibration_max_scale
        {
            return Err("calibration scale interval must be positive and ordered".to_string());
        }
        if self.calibration_accept_tolerance > self.calibration_fail_tolerance {
            return Err(
                "ROUTE_CALIBRATION_ACCEPT_TOLERANCE must not exceed the fail tolerance"
                    .to_string(),
            );
        }
        if !(0.0..=1.0).contains(&self.max_overlap_ratio) {
            return Err("ROUTE_MAX_OVERLAP_RATIO must be between 0 and 1".to_string());
        }
        if self.max_concurrent_requests == 0 {
            return Err("ROUTE_MAX_CONCURRENT_REQUESTS must be at least 1".to_string());
        }
        Ok(())
    }
}

impl Config {
    pub fn from_env() -> Result<Self, String> {
        dotenv::dotenv().ok();

        let engine = RouteEngineConfig::from_env()?;
        engine.validate()?;

        Ok(Config {
            host: env::var("HOST").unwrap_or_else(|_| DEFAULT_HOST.to_string()),
            port: env::var("PORT")
                .unwrap_or_else(|_| DEFAULT_PORT.to_string())
                .parse()
                .map_err(|_| "Invalid PORT")?,
            routing_api_key: env::var("ROUTING_API_KEY")
                .map_err(|_| "ROUTING_API_KEY must be set")?,
            routing_base_url: env::var("ROUTING_BASE_URL").ok(),
            elevation_base_url: env::var("ELEVATION_BASE_URL").ok(),
            llm_api_key: env::var("LLM_API_KEY").ok(),
            route_cache_ttl: env_parsed("ROUTE_CACHE_TTL", DEFAULT_ROUTE_CACHE_TTL_SECONDS)?,
            engine,
        })
    }

    pub fn server_address(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_engine_config_is_valid() {
        assert!(RouteEngineConfig::default().validate().is_ok());
    }

    #[test]
    fn test_validate_rejects_inverted_tolerances() {
        let config = RouteEngineConfig {
            calibration_accept_tolerance: 0.5,
            calibration_fail_tolerance: 0.25,
            ..Default::default()
        };
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_validate_rejects_bad_scale_interval() {
        let config = RouteEngineConfig {
            calibration_min_scale: 5.0,
            calibration_max_scale: 0.1,
            ..Default::default()
        };
        assert!(config.validate().is_err());
    }
}
