use shared::log_config::LogConfig;

#[derive(clap::ValueEnum, Clone, Debug, Copy)]
pub enum CargoEnv {
    Development,
    Production,
}

#[derive(clap::Parser)]
pub struct AppConfig {
    #[clap(long, env, value_enum, default_value = "development")]
    pub cargo_env: CargoEnv,

    #[clap(long, env, default_value = "5000")]
    pub port: u16,

    #[clap(long, env, help = "Base url of the upstream product API")]
    pub api_base_url: String,

    #[clap(
        long,
        env,
        hide_env_values = true,
        help = "Bearer token sent to the upstream product API"
    )]
    pub api_key: String,

    #[clap(long, env, default_value_t = 60, help = "Request timeout in seconds")]
    pub http_timeout: u64,

    #[clap(long, env)]
    pub rps: Option<u64>,

    #[clap(flatten)]
    pub log: LogConfig,
}
