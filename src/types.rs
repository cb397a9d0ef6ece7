use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// One image as the client sees it. The uuid is the only identifier that
/// crosses the wire; labels and row ids stay server-side until submission.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ImageInfo {
    pub uuid: Uuid,
    pub url: String,
    pub index: usize,
}

#[derive(Debug, Serialize)]
pub struct SelectionQuestion {
    pub category: String,
    pub images: Vec<ImageInfo>,
}

/// The client echoes back the exact grid it was shown; there is no
/// server-side session, so this echo is the whole description of the round.
#[derive(Debug, Deserialize)]
pub struct SelectionSubmission {
    pub images: Vec<ImageInfo>,
    pub selected: Vec<usize>,
    pub category_asked: String,
}

#[derive(Debug, Serialize)]
pub struct LabelingQuestion {
    pub images: Vec<ImageInfo>,
}

#[derive(Debug, Deserialize)]
pub struct LabelingSubmission {
    pub images: Vec<ImageInfo>,
    /// One label per image, in presentation order.
    pub answers: Vec<String>,
}

#[derive(Debug, Serialize)]
pub struct CountingQuestion {
    pub images: Vec<ImageInfo>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CategoryCount {
    pub category: String,
    pub amount: i64,
}

#[derive(Debug, Deserialize)]
pub struct CountingSubmission {
    pub images: Vec<ImageInfo>,
    pub answers: Vec<CategoryCount>,
}

#[derive(Debug, Serialize)]
pub struct Verdict {
    pub is_correct: bool,
}
