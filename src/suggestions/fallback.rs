//! Rule-based insight suggestions used when the LLM is unavailable or
//! returns too little. Four fixed slots, each with a trigger condition and
//! three phrasings chosen by a crude keyword-domain match.

use once_cell::sync::Lazy;
use regex::Regex;
use tracing::debug;

use crate::article::{distinct_publishers, Article};
use crate::engagement::{engagement_rate, CorpusAverages};
use crate::{InsightSuggestion, SECONDS_PER_DAY};

static TECH_PATTERN: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?i)AI|人工智能|技术|开发|编程|算法|模型|代码|工具|软件").expect("tech regex is valid") // Static pattern, safe to panic
});

static BUSINESS_PATTERN: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?i)商业|创业|营销|销售|增长|收入|客户|市场|品牌|策略").expect("business regex is valid") // Static pattern, safe to panic
});

static LIFESTYLE_PATTERN: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?i)生活|健康|教育|育儿|情感|心理|家庭|休闲|旅游|美食").expect("lifestyle regex is valid") // Static pattern, safe to panic
});

const HIGH_READ_MULTIPLIER: f64 = 1.5;
const HIGH_ENGAGEMENT_FLOOR: f64 = 5.0;
const HIGH_ENGAGEMENT_MULTIPLIER: f64 = 1.2;
const RECENT_WINDOW_DAYS: i64 = 7;
const MAX_FALLBACK_SUGGESTIONS: usize = 5;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum KeywordDomain {
    Technology,
    Business,
    Lifestyle,
}

impl KeywordDomain {
    /// Technology wins over business; anything else reads as lifestyle.
    pub fn classify(keyword: &str) -> Self {
        if TECH_PATTERN.is_match(keyword) {
            KeywordDomain::Technology
        } else if BUSINESS_PATTERN.is_match(keyword) {
            KeywordDomain::Business
        } else {
            if !LIFESTYLE_PATTERN.is_match(keyword) {
                debug!(keyword, "no keyword domain matched, using lifestyle phrasing");
            }
            KeywordDomain::Lifestyle
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            KeywordDomain::Technology => "technology",
            KeywordDomain::Business => "business",
            KeywordDomain::Lifestyle => "lifestyle",
        }
    }

    fn pick(self, technology: &'static str, business: &'static str, lifestyle: &'static str) -> &'static str {
        match self {
            KeywordDomain::Technology => technology,
            KeywordDomain::Business => business,
            KeywordDomain::Lifestyle => lifestyle,
        }
    }
}

/// Aggregates the fallback templates are conditioned on.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct FallbackStats {
    pub article_count: usize,
    pub averages: CorpusAverages,
    /// Mean rate over every article, zeros included.
    pub avg_engagement_rate: f64,
    pub high_read: usize,
    pub high_engagement: usize,
    pub recent: usize,
    pub unique_accounts: usize,
}

impl FallbackStats {
    pub fn compute(articles: &[Article], now: i64) -> Self {
        if articles.is_empty() {
            return Self::default();
        }

        let averages = CorpusAverages::compute(articles);
        let rates: Vec<f64> = articles.iter().map(engagement_rate).collect();
        let avg_engagement_rate = rates.iter().sum::<f64>() / rates.len() as f64;

        let high_read_threshold = averages.read * HIGH_READ_MULTIPLIER;
        let high_engagement_threshold =
            HIGH_ENGAGEMENT_FLOOR.max(avg_engagement_rate * HIGH_ENGAGEMENT_MULTIPLIER);
        let recent_cutoff = now - RECENT_WINDOW_DAYS * SECONDS_PER_DAY;

        Self {
            article_count: articles.len(),
            averages,
            avg_engagement_rate,
            high_read: articles
                .iter()
                .filter(|article| article.read as f64 >= high_read_threshold)
                .count(),
            high_engagement: rates
                .iter()
                .filter(|rate| **rate >= high_engagement_threshold)
                .count(),
            recent: articles
                .iter()
                .filter(|article| {
                    article
                        .resolved_publish_time()
                        .map(|published| published >= recent_cutoff)
                        .unwrap_or(false)
                })
                .count(),
            unique_accounts: distinct_publishers(articles).len(),
        }
    }
}

/// Never empty: one explanatory suggestion without data, otherwise the
/// four template slots.
pub fn build_fallback_suggestions(keyword: &str, articles: &[Article], now: i64) -> Vec<InsightSuggestion> {
    if articles.is_empty() {
        return vec![insufficient_data(keyword)];
    }

    let stats = FallbackStats::compute(articles, now);
    let domain = KeywordDomain::classify(keyword);
    debug!(
        keyword,
        domain = domain.label(),
        articles = stats.article_count,
        high_read = stats.high_read,
        high_engagement = stats.high_engagement,
        recent = stats.recent,
        accounts = stats.unique_accounts,
        "building fallback suggestions"
    );

    let mut suggestions = vec![
        engagement_breakthrough(domain, &stats),
        viral_structure(keyword, domain, &stats),
        cross_account_window(keyword, domain, &stats),
        cadence_management(keyword, domain, &stats),
    ];
    suggestions.truncate(MAX_FALLBACK_SUGGESTIONS);
    suggestions
}

fn insufficient_data(keyword: &str) -> InsightSuggestion {
    InsightSuggestion::new(
        "数据量不足提示",
        format!(
            "当前尚未搜集到与“{}”相关的有效文章数据，难以识别可执行的策略机会，建议扩大采集范围或延长时间窗口以形成统计意义。",
            keyword
        ),
        "需补充文章阅读、点赞、在看、发布时间和所属行业等字段，建立基础指标库后再进行趋势与对标分析。",
    )
}

fn engagement_breakthrough(domain: KeywordDomain, stats: &FallbackStats) -> InsightSuggestion {
    let rate = format!("{:.1}", stats.avg_engagement_rate);
    let reason = if stats.high_engagement > 0 {
        format!(
            "Top{}篇文章中有{}篇互动率超过均值{}%以上，{}。",
            stats.article_count,
            stats.high_engagement,
            rate,
            domain.pick(
                "说明技术实操类内容最受关注，建议增加\"使用技巧+避坑指南\"的对比内容",
                "表明商业模式和增长策略最容易引发讨论，可围绕\"成功案例+失败复盘\"展开",
                "显示实用生活技巧类内容共鸣度高，适合制作\"问题+解决方案\"的直接指导内容",
            )
        )
    } else {
        format!(
            "整体平均互动率为{}%，{}。",
            rate,
            domain.pick(
                "技术话题讨论理性，建议通过\"项目实战+效果对比\"提升参与度",
                "商业类内容需要更强的数据支撑和案例验证",
                "生活类话题可通过\"情感共鸣+实用价值\"增强粘性",
            )
        )
    };

    InsightSuggestion::new(
        "高互动场景突破",
        reason,
        "需抓取文章阅读、点赞、在看、粉丝规模和发布时间等数据，计算互动率分段，结合账号类型与内容题材做聚类分析，定位高互动场景。",
    )
}

fn viral_structure(keyword: &str, domain: KeywordDomain, stats: &FallbackStats) -> InsightSuggestion {
    let reason = if stats.high_read > 0 {
        format!(
            "{}篇文章阅读量高于均值 1.5 倍，{}，可围绕\"{}\"的落地流程拆解最佳实践。",
            stats.high_read,
            domain.pick(
                "技术评测和性能对比类内容最受欢迎，建议制作\"深度测评+实际应用\"的双重验证模式",
                "成功案例和数据分析类内容传播最广，可围绕\"ROI展示+方法总结\"构建内容矩阵",
                "实用教程和经验分享类内容传播效果好，适合\"步骤详解+效果展示\"的结构化表达",
            ),
            keyword
        )
    } else {
        format!(
            "阅读量分布相对均衡，{}，建议通过明确的成果指标或对比实验提升\"{}\"的内容价值。",
            domain.pick(
                "技术内容需要更强的可视化演示和实际效果展示",
                "商业类内容应增加数据图表和成功案例的具体展示",
                "生活类内容可通过痛点对比和前后效果对比提升吸引力",
            ),
            keyword
        )
    };

    InsightSuggestion::new(
        "爆款结构复用",
        reason,
        "整理文章标题、封面元素、阅读与点赞走势，结合发布时间和推文位置，运用相关性分析识别触发高阅读的结构要素并形成模版。",
    )
}

fn cross_account_window(keyword: &str, domain: KeywordDomain, stats: &FallbackStats) -> InsightSuggestion {
    let reason = if stats.unique_accounts > 1 {
        format!(
            "{}个公众号在最近周期同时输出\"{}\"相关内容，{}，适合从差异化角度切入抢占心智。",
            stats.unique_accounts,
            keyword,
            domain.pick(
                "技术领域竞争激烈，建议深耕细分场景或垂直领域",
                "商业赛道头部效应明显，需要找到差异化定位或目标人群细分",
                "生活类话题内容同质化严重，需寻找独特视角或专业深度",
            )
        )
    } else {
        format!(
            "当前主要由单一账号输出\"{}\"内容，{}，竞争相对温和，可通过持续深耕快速放大声量。",
            keyword,
            domain.pick(
                "技术蓝海市场可快速建立权威性",
                "商业话题有先发优势，可快速占领用户心智",
                "生活类话题缺乏竞争，有机会成为该领域的知识源头",
            )
        )
    };

    InsightSuggestion::new(
        "跨账号机会窗口",
        reason,
        "需要标记账号所属行业、粉丝规模与更新频次，结合文章阅读/互动表现做矩阵对比，输出产品定位与差异化策略建议。",
    )
}

fn cadence_management(keyword: &str, domain: KeywordDomain, stats: &FallbackStats) -> InsightSuggestion {
    let reason = if stats.recent > 0 {
        format!(
            "近7天内共有{}篇相关文章发布，{}，可据此安排\"{}\"的高价值内容上线节奏。",
            stats.recent,
            domain.pick(
                "技术用户习惯在工作日白天获取信息，建议在行业热点期快速响应",
                "商业决策者更关注周一至周五的晨间和晚间内容，可配合财经日历安排发布",
                "生活类用户在周末和晚间活跃度高，适合情感共鸣和实用指导内容",
            ),
            keyword
        )
    } else {
        format!(
            "近期更新频次偏低，{}，建议结合热点节点提前排期，打造系列化内容以维持\"{}\"的曝光。",
            domain.pick(
                "技术发展快速，需要保持稳定更新以维持技术权威性",
                "商业环境变化频繁，定期输出分析有助于建立专业形象",
                "生活类话题具有时效性，持续更新能够强化用户依赖",
            ),
            keyword
        )
    };

    InsightSuggestion::new(
        "节奏与窗口管理",
        reason,
        "采集文章发布时间、阅读首日走势和推送时间段，建立时间序列模型，评估最佳投放时段与内容更新节奏的影响。",
    )
}
