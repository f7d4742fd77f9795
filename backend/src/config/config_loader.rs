use std::{env, str::FromStr};

use anyhow::{Context, Result};

use super::{
    config_model::{Auth, BackendServer, Database, DotEnvyConfig, Llm},
    stage::Stage,
};

fn required(key: &str) -> Result<String> {
    env::var(key).with_context(|| format!("{key} is invalid"))
}

fn parsed_or<T>(key: &str, default: T) -> Result<T>
where
    T: FromStr,
    T::Err: std::error::Error + Send + Sync + 'static,
{
    match env::var(key) {
        Ok(raw) if !raw.trim().is_empty() => raw
            .trim()
            .parse()
            .with_context(|| format!("{key} is invalid")),
        _ => Ok(default),
    }
}

pub fn load() -> Result<DotEnvyConfig> {
    dotenvy::dotenv().ok();

    let backend_server = BackendServer {
        port: required("SERVER_PORT_BACKEND")?
            .parse()
            .context("SERVER_PORT_BACKEND is invalid")?,
        body_limit: required("SERVER_BODY_LIMIT")?
            .parse()
            .context("SERVER_BODY_LIMIT is invalid")?,
        timeout: required("SERVER_TIMEOUT")?
            .parse()
            .context("SERVER_TIMEOUT is invalid")?,
    };

    let database = Database {
        url: required("DATABASE_URL")?,
        max_connections: parsed_or("DATABASE_MAX_CONNECTIONS", 10)?,
    };

    let auth = get_auth_secret()?;

    let llm = Llm {
        base_url: env::var("LLM_BASE_URL")
            .unwrap_or_else(|_| "https://api.openai.com/v1".to_string()),
        api_key: required("LLM_API_KEY")?,
        model: env::var("LLM_MODEL").unwrap_or_else(|_| "gpt-4o".to_string()),
        temperature: parsed_or("LLM_TEMPERATURE", 0.2)?,
        top_p: parsed_or("LLM_TOP_P", 0.1)?,
        request_timeout_secs: parsed_or("LLM_REQUEST_TIMEOUT", 120)?,
        rate_limit_delay_ms: parsed_or("LLM_RATE_LIMIT_DELAY_MS", 3000)?,
        max_retries: parsed_or("LLM_MAX_RETRIES", 2)?,
        batch_size: parsed_or("LLM_BATCH_SIZE", 10)?,
        max_frames_per_video: parsed_or("LLM_MAX_FRAMES_PER_VIDEO", 25)?,
    };

    Ok(DotEnvyConfig {
        backend_server,
        database,
        auth,
        llm,
    })
}

pub fn get_stage() -> Stage {
    dotenvy::dotenv().ok();

    let stage_str = env::var("STAGE").unwrap_or_default();
    Stage::try_from(&stage_str).unwrap_or_default()
}

pub fn get_auth_secret() -> Result<Auth> {
    dotenvy::dotenv().ok();

    Ok(Auth {
        jwt_secret: required("JWT_SECRET")?,
    })
}
