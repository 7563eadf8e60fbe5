use reqwest::header::AUTHORIZATION;
use serde::{Deserialize, Serialize};
use std::env;
use std::time::{Duration, Instant};
use tracing::{debug, info, warn};

use topic_insight::{engagement_rate, format_float, Article, LlmConfig, LlmResponse};

#[derive(Debug, thiserror::Error)]
pub enum LlmError {
    #[error("LLM API error {status}: {detail}")]
    Status {
        status: u16,
        detail: String,
        retryable: bool,
    },

    #[error("LLM request failed: {0}")]
    Network(String),

    #[error("LLM request timed out after {0} ms")]
    Timeout(u64),

    #[error("LLM response parse failed: {0}")]
    Parse(String),

    #[error("LLM response has no content")]
    Empty,

    #[error("no articles to analyze")]
    NoArticles,
}

#[derive(Clone)]
pub struct LlmClient {
    client: reqwest::Client,
    api_key: String,
    config: LlmConfig,
}

impl LlmClient {
    /// `None` when `OPENROUTER_API_KEY` is unset or blank.
    pub fn from_env(config: &LlmConfig, model_override: Option<String>) -> Option<Self> {
        let api_key = env::var("OPENROUTER_API_KEY")
            .ok()
            .filter(|key| !key.trim().is_empty())?;
        let mut config = config.clone();
        if let Some(model) = model_override.filter(|model| !model.trim().is_empty()) {
            config.model = model;
        }
        Some(Self::new(api_key, config))
    }

    pub fn new(api_key: String, config: LlmConfig) -> Self {
        Self {
            client: reqwest::Client::new(),
            api_key,
            config,
        }
    }

    pub fn model(&self) -> &str {
        &self.config.model
    }

    /// Asks the model for topic suggestions over `articles` (already ordered
    /// most-praised first). Returns the raw reply text.
    pub async fn suggest_topics(&self, keyword: &str, articles: &[Article]) -> Result<LlmResponse, LlmError> {
        if articles.is_empty() {
            return Err(LlmError::NoArticles);
        }

        let prompt_articles = &articles[..articles.len().min(self.config.prompt_articles)];
        let request = ChatRequest {
            model: self.config.model.clone(),
            temperature: self.config.temperature,
            max_tokens: self.config.max_tokens,
            messages: vec![
                ChatMessage {
                    role: "system".to_string(),
                    content: system_prompt(),
                },
                ChatMessage {
                    role: "user".to_string(),
                    content: user_prompt(keyword, prompt_articles, self.config.snippet_chars),
                },
            ],
        };

        let started = Instant::now();
        let response = self.post_with_retry(&request).await?;
        let body: ChatResponse = response
            .json()
            .await
            .map_err(|err| LlmError::Parse(err.to_string()))?;

        let content = body
            .choices
            .first()
            .and_then(|choice| choice.message.content.as_deref())
            .map(str::trim)
            .filter(|content| !content.is_empty())
            .ok_or(LlmError::Empty)?
            .to_string();

        let latency_ms = started.elapsed().as_millis();
        info!(
            model = %self.config.model,
            latency_ms = latency_ms as u64,
            chars = content.chars().count(),
            "LLM reply received"
        );

        Ok(LlmResponse {
            model: body.model.unwrap_or_else(|| self.config.model.clone()),
            content,
            latency_ms,
        })
    }

    async fn post_with_retry(&self, request: &ChatRequest) -> Result<reqwest::Response, LlmError> {
        let attempts = self.config.max_retries.max(1);
        let mut attempt = 1u32;

        loop {
            debug!(attempt, attempts, endpoint = %self.config.endpoint, "calling LLM");
            let result = self
                .client
                .post(&self.config.endpoint)
                .header(AUTHORIZATION, format!("Bearer {}", self.api_key))
                .header("X-Title", "Topic Insight")
                .timeout(Duration::from_millis(self.config.timeout_ms))
                .json(request)
                .send()
                .await;

            let (error, backoff_ms) = match result {
                Ok(response) if response.status().is_success() => return Ok(response),
                Ok(response) => {
                    let status = response.status();
                    let detail = response
                        .text()
                        .await
                        .unwrap_or_default()
                        .trim()
                        .to_string();
                    let retryable = status.is_server_error();
                    let error = LlmError::Status {
                        status: status.as_u16(),
                        detail,
                        retryable,
                    };
                    if !retryable {
                        return Err(error);
                    }
                    (error, self.config.retry_backoff_ms)
                }
                Err(err) if err.is_timeout() => {
                    (LlmError::Timeout(self.config.timeout_ms), self.config.network_backoff_ms)
                }
                Err(err) => (LlmError::Network(err.to_string()), self.config.network_backoff_ms),
            };

            if attempt >= attempts {
                return Err(error);
            }

            let wait_ms = backoff_ms * u64::from(attempt);
            warn!(attempt, attempts, wait_ms, error = %error, "LLM call failed, retrying");
            tokio::time::sleep(Duration::from_millis(wait_ms)).await;
            attempt += 1;
        }
    }
}

#[derive(Serialize)]
struct ChatRequest {
    model: String,
    messages: Vec<ChatMessage>,
    temperature: f64,
    max_tokens: u32,
}

#[derive(Serialize)]
struct ChatMessage {
    role: String,
    content: String,
}

#[derive(Deserialize)]
struct ChatResponse {
    #[serde(default)]
    model: Option<String>,
    #[serde(default)]
    choices: Vec<ChatChoice>,
}

#[derive(Deserialize)]
struct ChatChoice {
    message: ChatMessageResponse,
}

#[derive(Deserialize)]
struct ChatMessageResponse {
    #[serde(default)]
    content: Option<String>,
}

fn system_prompt() -> String {
    let prompt = r#"你是一名公众号内容策略分析师，负责从高表现文章中提炼可执行的选题策略。
你会收到一个关键词，以及若干篇文章的标题、账号、阅读、点赞、在看、互动率、发布时间和内容摘要。
先在内部拆解标题特征、内容方向、用户痛点、内容结构和高互动特征，再输出 3~5 条可直接用于写作的选题方案。
规则：
- title 不超过 15 个字，可直接作为文章标题方向；
- reason 分行写明：选题方向、目标受众、核心痛点、内容角度、推荐结构、内容形式、标题参考（3个）、预期互动潜力（高/中高/中）；
- data_support 写数据支撑说明或创作提醒；
- 只输出 JSON：{"suggestions":[{"title":"...","reason":"...","data_support":"..."}]}，不要输出其他文字。
"#;
    prompt.to_string()
}

fn user_prompt(keyword: &str, articles: &[Article], snippet_chars: usize) -> String {
    let summaries: Vec<String> = articles
        .iter()
        .enumerate()
        .map(|(index, article)| {
            let snippet: String = article
                .content
                .chars()
                .take(snippet_chars)
                .collect::<String>()
                .replace('\n', " ")
                .trim()
                .to_string();
            let account = if article.wx_name.trim().is_empty() {
                "未知公众号"
            } else {
                article.wx_name.as_str()
            };
            format!(
                "{}. 标题：{}\n账号：{}\n数据：{}读|{}赞|{}在看|{}%互动率\n时间：{}\n摘要：{}",
                index + 1,
                article.title,
                account,
                article.read,
                article.praise,
                article.looking,
                format_float(engagement_rate(article), 1),
                article.publish_time_str.as_deref().unwrap_or_default(),
                snippet
            )
        })
        .collect();

    format!(
        "关键词：{}\n请分析以下 {} 篇高表现文章（按点赞数排序），聚焦标题特征、内容方向和用户痛点，输出 3~5 条可执行的选题策略：\n\n{}\n\n严格输出 {{\"suggestions\":[...]}} 格式的 JSON，无其他文字。",
        keyword,
        articles.len(),
        summaries.join("\n\n")
    )
}
