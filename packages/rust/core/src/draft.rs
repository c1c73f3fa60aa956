//! Draft generation: row fields → prompt → chat completion.
//!
//! Prompt construction is pure ([`PromptContext::from_row`] and
//! [`build_prompt`]); only [`generate_draft`] talks to the provider.

use tracing::{debug, instrument};

use blogdraft_llm::{ChatCompletion, ChatMessage, ChatRequest};
use blogdraft_shared::{ColumnsConfig, FieldKind, Result, Row};

/// System-role instruction sent with every request.
pub const SYSTEM_INSTRUCTION: &str = "넌 네이버 블로그 맛집 리뷰 전문 작가야.";

// ---------------------------------------------------------------------------
// Prompt context
// ---------------------------------------------------------------------------

/// Row fields the prompt is built from. Missing fields are empty strings.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PromptContext {
    pub restaurant: String,
    pub menu: String,
    pub visit_time: String,
    pub location: String,
    pub category: String,
    pub hours: String,
    pub break_time: String,
    pub holiday: String,
    /// Multi-select options joined with ", ".
    pub keywords: String,
    pub primary_keyword: String,
}

impl PromptContext {
    /// Project a row onto the prompt fields.
    ///
    /// Returns `None` when the restaurant name is missing or blank.
    pub fn from_row(row: &Row, columns: &ColumnsConfig) -> Option<Self> {
        let restaurant = row.text(&columns.title, FieldKind::Title).trim().to_string();
        if restaurant.is_empty() {
            return None;
        }

        let rich = |name: &str| row.text(name, FieldKind::RichText).trim().to_string();
        let keywords = row.multi_select(&columns.keywords).join(", ");
        let primary_keyword = primary_keyword(&keywords, &restaurant);

        Some(Self {
            menu: rich(&columns.menu),
            visit_time: rich(&columns.visit_time),
            location: rich(&columns.location),
            category: rich(&columns.category),
            hours: rich(&columns.hours),
            break_time: rich(&columns.break_time),
            holiday: rich(&columns.holiday),
            keywords,
            primary_keyword,
            restaurant,
        })
    }
}

/// First comma-separated keyword, or the restaurant name when there is none.
pub fn primary_keyword(keywords: &str, restaurant: &str) -> String {
    keywords
        .split(',')
        .map(str::trim)
        .find(|k| !k.is_empty())
        .unwrap_or(restaurant)
        .to_string()
}

// ---------------------------------------------------------------------------
// Prompt template
// ---------------------------------------------------------------------------

/// Render the user-role prompt for one restaurant.
///
/// Layout: title line, subtitle, waiting time, opening hours
/// (weekday/weekend/break/holiday), four photo sections, SEO tags.
pub fn build_prompt(ctx: &PromptContext) -> String {
    let region = or_placeholder(&ctx.location, "지역 이름");
    let category = or_placeholder(&ctx.category, "메뉴 카테고리");

    let mut prompt = String::new();

    prompt.push_str(
        "너는 네이버 블로그에 맛집 후기를 연재하는 작가야. 아래 정보로 내 블로그 스타일에 맞는 긴 후기 글을 써줘.\n",
    );
    prompt.push_str(
        "- 검색 노출(SEO)을 고려하고, 타이틀과 서브타이틀은 한눈에 띄게 써줘. 살짝 자극적이어도 괜찮아.\n",
    );
    prompt.push_str("- 말투는 친근한 존댓말로 해줘. 예: \"~했어요~\", \"~입니다.\"\n");
    prompt.push_str("- 맞춤법은 꼼꼼히 확인해줘.\n");
    prompt.push_str("- 참고하는 검색 결과는 구글보다 네이버 기준으로 해줘.\n");
    prompt.push_str("- 메뉴는 이 가게 검색 유입이 가장 많은 메뉴부터 소개해줘.\n");
    prompt.push_str(&format!(
        "- 대표 키워드 \"{}\"를 타이틀과 본문에 자연스럽게 넣어줘.\n",
        ctx.primary_keyword
    ));
    if !ctx.keywords.is_empty() {
        prompt.push_str(&format!("- 다음 키워드는 반드시 포함해줘: {}\n", ctx.keywords));
    }

    prompt.push_str(&format!(
        "
블로그 형식은 다음과 같아.

타이틀
[{region}/{category}] 타이틀 | {restaurant}

본문
타이틀 \"{restaurant}\"
서브타이틀
웨이팅 소요 시간
{visit_time}
--
영업시간
평일 : {hours}
주말 : {hours}
브레이크타임 : {break_time}
휴무정보 : {holiday}
--

\"내부 사진과 설명\"
(좌석 간격과 분위기)
\"메뉴판과 설명\"
(메뉴판 사진)
{menu}
(인기 메뉴 설명)
\"테이블 세팅과 설명\"
(기본 반찬, 테이블 기본 세팅)
\"음식\"
(음식 사진과 맛 설명)

SEO 최적화 태그
(#{primary} 포함, 쉼표 없이 해시태그로 나열)
",
        restaurant = ctx.restaurant,
        visit_time = ctx.visit_time,
        hours = ctx.hours,
        break_time = ctx.break_time,
        holiday = ctx.holiday,
        menu = ctx.menu,
        primary = ctx.primary_keyword,
    ));

    prompt
}

fn or_placeholder<'a>(value: &'a str, placeholder: &'a str) -> &'a str {
    if value.is_empty() { placeholder } else { value }
}

// ---------------------------------------------------------------------------
// Generation
// ---------------------------------------------------------------------------

/// Generate a blog draft for `row`.
///
/// Returns an empty string, without calling the provider, when the row has
/// no restaurant name. Also empty when the provider answers without choices.
#[instrument(skip_all, fields(row_id = %row.id))]
pub async fn generate_draft(
    llm: &dyn ChatCompletion,
    model: &str,
    columns: &ColumnsConfig,
    row: &Row,
) -> Result<String> {
    let Some(ctx) = PromptContext::from_row(row, columns) else {
        debug!(column = %columns.title, "restaurant name is blank, not requesting a draft");
        return Ok(String::new());
    };

    let request = ChatRequest {
        model: model.to_string(),
        messages: vec![
            ChatMessage::system(SYSTEM_INSTRUCTION),
            ChatMessage::user(build_prompt(&ctx)),
        ],
    };

    debug!(restaurant = %ctx.restaurant, keyword = %ctx.primary_keyword, "requesting draft");
    let response = llm.complete(&request).await?;
    Ok(response.first_text())
}
