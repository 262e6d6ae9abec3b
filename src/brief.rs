//! Emergency-brief generation via an external text-generation service.
//!
//! The household report is flattened into a structured Vietnamese prompt
//! (per-building, per-floor marker summaries included) and sent to a
//! Gemini-style `generateContent` endpoint. This is strictly
//! request/response: no retry, no streaming, and any failure collapses to
//! a fixed fallback string so the form itself never breaks.

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::state::household::{Building, Floor, HouseholdInfo};

/// Shown when the service responds but produces no usable text.
pub const EMPTY_BRIEF: &str = "Không thể tạo bản tóm tắt chỉ thị.";
/// Shown when the request itself fails.
pub const FALLBACK_BRIEF: &str = "Lỗi phân tích dữ liệu AI.";

const DEFAULT_ENDPOINT: &str =
    "https://generativelanguage.googleapis.com/v1beta/models/gemini-2.0-flash:generateContent";

#[derive(Debug, Error)]
enum BriefError {
    #[error("GEMINI_API_KEY chưa được cấu hình")]
    MissingApiKey,
    #[error(transparent)]
    Http(#[from] reqwest::Error),
    #[error("phản hồi không chứa văn bản")]
    EmptyResponse,
}

#[derive(Serialize)]
struct GenerateRequest {
    contents: Vec<Content>,
}

#[derive(Serialize, Deserialize)]
struct Content {
    parts: Vec<Part>,
}

#[derive(Serialize, Deserialize)]
struct Part {
    text: String,
}

#[derive(Deserialize)]
struct GenerateResponse {
    #[serde(default)]
    candidates: Vec<Candidate>,
}

#[derive(Deserialize)]
struct Candidate {
    content: Content,
}

/// Per-floor marker roll-up used inside the prompt. A customized label is
/// appended in parentheses after the catalog noun.
fn floor_summary(floor: &Floor) -> String {
    let markers: Vec<String> = floor
        .gallery
        .images()
        .iter()
        .flat_map(|img| img.markers())
        .map(|m| {
            let noun = m.kind.catalog().default_label;
            if m.has_custom_label() {
                format!("{} ({})", noun, m.label)
            } else {
                noun.to_string()
            }
        })
        .collect();

    if markers.is_empty() {
        format!("  - {}: Không có đánh dấu", floor.name)
    } else {
        format!("  - {}: {}", floor.name, markers.join(", "))
    }
}

fn building_summary(building: &Building) -> String {
    let floors: Vec<String> = building.floors.iter().map(floor_summary).collect();
    format!("- Khối nhà: {}\n{}", building.name, floors.join("\n"))
}

/// Flatten the whole report into the rescue-directive prompt.
pub fn build_prompt(info: &HouseholdInfo) -> String {
    let structure: Vec<String> = info.buildings.iter().map(building_summary).collect();
    let (latitude, longitude) = match info.coordinates {
        Some(c) => (c.latitude.to_string(), c.longitude.to_string()),
        None => ("?".to_string(), "?".to_string()),
    };

    format!(
        "Dựa trên thông tin cơ sở đa cấu trúc sau, hãy tạo một bản tóm tắt chỉ thị cứu hộ khẩn cấp cho lực lượng PCCC (114).\n\
         \n\
         THÔNG TIN CƠ BẢN:\n\
         - NGƯỜI BÁO CÁO: {reporter} ({relationship})\n\
         - ĐIỆN THOẠI: {phone}\n\
         - ĐỊA CHỈ: {address}\n\
         - TỌA ĐỘ GPS: Latitude {latitude}, Longitude {longitude}\n\
         \n\
         NHÂN KHẨU (ƯU TIÊN CỨU HỘ):\n\
         - Người già: {elderly}, Trẻ nhỏ: {children}, Khó vận động: {mobility}\n\
         \n\
         CẤU TRÚC & VỊ TRÍ CHI TIẾT (DỰA TRÊN SƠ ĐỒ):\n\
         {structure}\n\
         \n\
         CẢNH BÁO NGUY HIỂM & TRANG THIẾT BỊ:\n\
         - Thiết bị PCCC tại chỗ: {equipment}\n\
         - Khu vực nguy hiểm cháy nổ: {hazards}\n\
         - Điểm tập kết an toàn: {assembly}\n\
         \n\
         Yêu cầu:\n\
         1. Trình bày cực kỳ súc tích theo dạng gạch đầu dòng lệnh.\n\
         2. Nêu rõ ưu tiên cứu hộ người già/trẻ em tại tầng nào.\n\
         3. Cảnh báo các khu vực \"Nguy hiểm cháy nổ\" cụ thể dựa trên thông tin cung cấp.\n\
         4. Ngôn ngữ: Tiếng Việt, chuyên nghiệp, khẩn cấp.",
        reporter = info.reporter.full_name,
        relationship = info.reporter.relationship,
        phone = info.reporter.phone,
        address = info.address,
        latitude = latitude,
        longitude = longitude,
        elderly = info.residents.elderly,
        children = info.residents.children,
        mobility = info.residents.mobility_impaired,
        structure = structure.join("\n\n"),
        equipment = non_empty(&info.fire_equipment, "Không rõ"),
        hazards = non_empty(&info.hazards, "Theo đánh dấu trên sơ đồ"),
        assembly = info.assembly_point,
    )
}

fn non_empty<'a>(value: &'a str, fallback: &'a str) -> &'a str {
    if value.trim().is_empty() {
        fallback
    } else {
        value
    }
}

/// Generate the brief for an already-built prompt. Never fails outward:
/// every error path collapses to a fixed string.
pub async fn generate(prompt: String) -> String {
    match request_brief(prompt).await {
        Ok(text) => text,
        Err(BriefError::EmptyResponse) => {
            tracing::warn!("brief service returned no text");
            EMPTY_BRIEF.to_string()
        }
        Err(e) => {
            tracing::error!(error = %e, "brief generation failed");
            FALLBACK_BRIEF.to_string()
        }
    }
}

async fn request_brief(prompt: String) -> Result<String, BriefError> {
    let api_key = std::env::var("GEMINI_API_KEY").map_err(|_| BriefError::MissingApiKey)?;
    let endpoint =
        std::env::var("FIRESAFE_BRIEF_URL").unwrap_or_else(|_| DEFAULT_ENDPOINT.to_string());

    let request = GenerateRequest {
        contents: vec![Content {
            parts: vec![Part { text: prompt }],
        }],
    };

    let client = reqwest::Client::new();
    let response: GenerateResponse = client
        .post(&endpoint)
        .query(&[("key", api_key.as_str())])
        .json(&request)
        .send()
        .await?
        .error_for_status()?
        .json()
        .await?;

    extract_text(response).ok_or(BriefError::EmptyResponse)
}

/// Concatenate every candidate part into one brief. `None` when the
/// service produced no usable text.
fn extract_text(response: GenerateResponse) -> Option<String> {
    let text = response
        .candidates
        .into_iter()
        .flat_map(|c| c.content.parts)
        .map(|p| p.text)
        .collect::<Vec<_>>()
        .join("");

    if text.trim().is_empty() {
        None
    } else {
        Some(text)
    }
}
