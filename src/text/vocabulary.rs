use once_cell::sync::Lazy;
use std::collections::{HashMap, HashSet};

/// Function words and generic nouns that say nothing about a topic.
const STOP_WORDS: &[&str] = &[
    // pronouns and connectives
    "我们", "你们", "他们", "她们", "它们", "自己", "大家", "所有", "这个", "那个", "这些",
    "那些", "这样", "那样", "这里", "那里", "哪里", "什么", "怎么", "哪些", "哪种", "以及",
    "但是", "所以", "然后", "不是", "因为", "因此", "如果", "如何", "或者", "而且", "并且",
    "不过", "只是", "就是", "其实", "其中", "还是", "为了", "关于", "针对", "对于", "通过",
    "作为", "比如", "比如说", "例如", "虽然", "即使", "只要", "除了", "以后", "之后", "之前",
    "甚至", "尤其", "于是", "总之",
    // modal and degree words
    "可以", "已经", "不会", "可能", "应该", "能够", "需要", "必须", "一定", "非常", "更加",
    "不断", "觉得", "认为", "表示", "希望", "喜欢", "没有", "真的", "特别", "十分", "最好",
    // quantities and ordinals
    "一个", "两个", "三个", "一些", "很多", "部分", "每个", "多个", "各种", "不同", "一种",
    "第一", "第二", "第三", "一次", "一起", "一下",
    // generic verbs
    "进行", "提升", "提高", "发展", "实施", "完成", "达到", "实现", "带来", "创造", "打造",
    "发现", "选择", "带着", "注意", "看到", "关注", "了解", "分享", "推荐", "点击", "查看",
    "登录", "下载", "拥有", "具有", "相关", "方式", "使用", "开始", "成为", "出现", "知道",
    // audiences and actors
    "用户", "读者", "观众", "朋友", "老师", "同学", "孩子", "父母", "家长", "企业", "公司",
    "客户", "平台", "产品",
    // article furniture
    "文章", "内容", "标题", "摘要", "作者", "阅读", "点赞", "互动", "评论", "粉丝", "公众号",
    "微信", "原文", "链接", "来源", "转载", "图片", "视频", "扫码", "二维码", "留言",
    // time words
    "同时", "目前", "现在", "未来", "去年", "今年", "明年", "本次", "此次", "每天", "每年",
    "每日", "每周", "近期", "最近", "今天", "昨天", "明天", "日前", "快来", "速看",
    // latin noise
    "the", "and", "for", "with", "this", "that", "from", "are", "was", "www", "http", "https",
    "com",
];

/// Trailing honorifics and titles, longest first so `董事长` wins over shorter ones.
pub const HONORIFIC_SUFFIXES: [&str; 6] = ["董事长", "先生", "老师", "女士", "小姐", "总"];

/// Suffixes appended to the first character of a keyword to form
/// nicknames such as `雷总` for `雷军`.
pub const NICKNAME_SUFFIXES: [&str; 3] = ["总", "老师", "先生"];

/// Currency and unit endings: `万元 -> 万`, `亿元 -> 亿`, bare `元`/`块` dropped.
pub const UNIT_REWRITES: [(&str, &str); 4] = [("万元", "万"), ("亿元", "亿"), ("元", ""), ("块", "")];

/// Variant organisation names collapsed to one canonical spelling.
const CANONICAL_FORMS: &[(&str, &str)] = &[
    ("阿里巴巴集团", "阿里巴巴"),
    ("阿里集团", "阿里巴巴"),
    ("阿里", "阿里巴巴"),
    ("腾讯公司", "腾讯"),
    ("腾讯集团", "腾讯"),
    ("字节", "字节跳动"),
    ("字节跳动公司", "字节跳动"),
    ("百度公司", "百度"),
    ("华为公司", "华为"),
    ("华为技术", "华为"),
    ("小米集团", "小米"),
    ("小米公司", "小米"),
    ("微软公司", "微软"),
    ("苹果公司", "苹果"),
    ("openai公司", "openai"),
    ("比亚迪汽车", "比亚迪"),
    ("特斯拉汽车", "特斯拉"),
    ("人工智能", "ai"),
];

static STOP_WORD_SET: Lazy<HashSet<&'static str>> = Lazy::new(|| STOP_WORDS.iter().copied().collect());

static CANONICAL_MAP: Lazy<HashMap<&'static str, &'static str>> =
    Lazy::new(|| CANONICAL_FORMS.iter().copied().collect());

pub fn is_stop_word(token: &str) -> bool {
    STOP_WORD_SET.contains(token)
}

pub fn canonical_form(token: &str) -> Option<&'static str> {
    CANONICAL_MAP.get(token).copied()
}
