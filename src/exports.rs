pub use {
    anyhow,
    bio,
    itertools,
    log,
    pretty_env_logger,
    serde,
    serde_json,
};
