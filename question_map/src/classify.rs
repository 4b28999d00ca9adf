use log::debug;

/// The shape of a question, decided from its type signature.
///
/// The signature is the comma-joined string computed by the data map
/// formulas (system, open text, numerical, simple select, multi select
/// placeholder, rank, matrix, loop, double loop, other specify role). Only
/// exact matches against the known signatures are recognized.
#[derive(Eq, PartialEq, Debug, Clone, Copy, Hash)]
pub enum QuestionType {
    SingleSelect,
    /// A single select with one option linked to a free-text child question.
    SingleSelectWithOther,
    OtherSpecifyChild,
    OpenText,
    Numeric,
    Rank,
    Matrix,
    System,
    Unclassified,
}

const KNOWN_SIGNATURES: [(&str, QuestionType); 8] = [
    (
        "0, 0, 0, Simple Select, , 0, 0, 0, 0, Other Specify Parent",
        QuestionType::SingleSelectWithOther,
    ),
    (
        "0, 0, 0, Simple Select, , 0, 0, 0, 0, 0",
        QuestionType::SingleSelect,
    ),
    (
        "0, Open Text, 0, 0, , 0, 0, 0, 0, Other Specify Child",
        QuestionType::OtherSpecifyChild,
    ),
    (
        "0, Open Text, 0, 0, , 0, 0, 0, 0, 0",
        QuestionType::OpenText,
    ),
    (
        "0, 0, Numerical, 0, , 0, 0, 0, 0, 0",
        QuestionType::Numeric,
    ),
    (
        "0, 0, 0, Simple Select, , Rank, 0, 0, 0, 0",
        QuestionType::Rank,
    ),
    (
        "0, 0, 0, Simple Select, , 0, Matrix, 0, 0, 0",
        QuestionType::Matrix,
    ),
    (
        "System Question, 0, 0, 0, , 0, 0, 0, 0, 0",
        QuestionType::System,
    ),
];

impl QuestionType {
    /// Classifies a type signature. Total: anything unknown is `Unclassified`.
    pub fn classify(signature: &str) -> QuestionType {
        let sig = signature.trim();
        let res = KNOWN_SIGNATURES
            .iter()
            .find(|(s, _)| *s == sig)
            .map(|(_, qt)| *qt)
            .unwrap_or(QuestionType::Unclassified);
        debug!("classify: {:?} -> {:?}", sig, res);
        res
    }

    /// The literal signature of a known type.
    pub fn signature(&self) -> Option<&'static str> {
        KNOWN_SIGNATURES
            .iter()
            .find(|(_, qt)| qt == self)
            .map(|(s, _)| *s)
    }

    /// Only the select questions get a response table.
    pub fn has_tab_layout(&self) -> bool {
        matches!(
            self,
            QuestionType::SingleSelect | QuestionType::SingleSelectWithOther
        )
    }

    pub fn name(&self) -> &'static str {
        match self {
            QuestionType::SingleSelect => "singleSelect",
            QuestionType::SingleSelectWithOther => "singleSelectWithOther",
            QuestionType::OtherSpecifyChild => "otherSpecifyChild",
            QuestionType::OpenText => "openText",
            QuestionType::Numeric => "numeric",
            QuestionType::Rank => "rank",
            QuestionType::Matrix => "matrix",
            QuestionType::System => "system",
            QuestionType::Unclassified => "unclassified",
        }
    }
}
