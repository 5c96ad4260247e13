//! Fixed display copy
//!
//! Exhibit copy shared by every surface. Surface-specific key hints stay
//! with the surface.
//! The display language is fixed (Japanese); there is no localization layer.

/// Page title
pub const TITLE: &str = "もしもあなたが動物園で飼育されていたら！？";

/// Page subtitle
pub const SUBTITLE: &str = "AI Official Exhibit Creator";

/// Name field label
pub const NAME_LABEL: &str = "展示名（あなたのお名前）";
/// Hobby field label
pub const HOBBY_LABEL: &str = "生態的特徴（特技・趣味・好きなもの）";
/// Worry field label
pub const WORRY_LABEL: &str = "最近観測された行動（悩み・近況）";

/// Name field placeholder
pub const NAME_PLACEHOLDER: &str = "例：山田 太郎";
/// Hobby field placeholder
pub const HOBBY_PLACEHOLDER: &str = "例：週末は一日中ゲーム、甘いものに目がない";
/// Worry field placeholder
pub const WORRY_PLACEHOLDER: &str = "例：最近、夜更かしをして昼まで寝ている。運動不足が気になる。";

/// Submit action
pub const SUBMIT_LABEL: &str = "看板をデザインする";

/// Export action, idle
pub const EXPORT_IDLE_LABEL: &str = "🖼️ 解説看板を画像として保存";
/// Export action while rasterizing
pub const EXPORT_BUSY_LABEL: &str = "🎨 書き出し中...";
/// "Make another" action
pub const MAKE_ANOTHER_LABEL: &str = "別の看板を作る";

/// The one message shown for every generation failure
pub const GENERATION_FAILED: &str =
    "飼育データの解析に失敗しました。時間をおいて再度お試しください。";
/// Alert shown when the exporter reports failure
pub const EXPORT_FAILED: &str = "画像の保存に失敗しました。";
/// Status line warning when the generation service does not answer a health check
pub const BACKEND_UNREACHABLE: &str = "AIサービスに接続できません。設定を確認してください。";

/// Signboard: danger level prefix
pub const DANGER_PREFIX: &str = "危険度：";
/// Signboard: commentary box caption
pub const KEEPER_COMMENTARY: &str = "飼育員による解説";
/// Signboard: fun fact caption
pub const FUN_FACT: &str = "豆知識";

/// Stamina stat label
pub const STAT_STAMINA: &str = "体力";
/// Intelligence stat label
pub const STAT_INTELLIGENCE: &str = "知性";
/// Laziness stat label
pub const STAT_LAZINESS: &str = "怠惰";
/// Charm stat label
pub const STAT_CHARM: &str = "愛嬌";

/// Status messages cycled while a generation is in flight
pub const LOADING_MESSAGES: &[&str] = &[
    "飼育員があなたの生態を観察しています...",
    "檻のサイズを測定しています...",
    "学名をラテン語辞典で調べています...",
    "エサの好みを分析しています...",
    "危険度を慎重に判定しています...",
    "解説看板にペンキを塗っています...",
];

/// Farewells printed after the terminal is restored
pub const FAREWELLS: &[&str] = &[
    "本日の営業は終了しました。",
    "またのご来園をお待ちしております！",
    "エサやりの時間です。さようなら！",
    "閉園のお時間です。お気をつけてお帰りください。",
    "飼育員より：よく眠ってくださいね。",
];
