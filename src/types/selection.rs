use std::fmt;

/// Top-level driving category.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Category {
    Abnormal,
    Normal,
}

const ABNORMAL_LABELS: [&str; 4] = ["급가속", "급정지", "급좌회전", "급우회전"];
const NORMAL_LABELS: [&str; 4] = ["정상 가속", "정상 감속", "정상 좌회전", "정상 우회전"];

impl Category {
    pub const ALL: [Category; 2] = [Category::Abnormal, Category::Normal];

    /// Parameter key handed between screens.
    pub fn key(self) -> &'static str {
        match self {
            Category::Abnormal => "abnormal",
            Category::Normal => "normal",
        }
    }

    /// Directory name under `Driver/`.
    pub fn dir_name(self) -> &'static str {
        match self {
            Category::Abnormal => "이상",
            Category::Normal => "정상",
        }
    }

    /// The four labels offered for this category.
    pub fn labels(self) -> &'static [&'static str; 4] {
        match self {
            Category::Abnormal => &ABNORMAL_LABELS,
            Category::Normal => &NORMAL_LABELS,
        }
    }

    /// Accepts either the key (`normal`) or the directory name (`정상`).
    pub fn parse(value: &str) -> Option<Category> {
        let value = value.trim();
        Category::ALL
            .into_iter()
            .find(|c| c.key() == value || c.dir_name() == value)
    }
}

impl fmt::Display for Category {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.dir_name())
    }
}

/// A fully populated (category, label) pair.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Selection {
    category: Category,
    label: String,
}

impl Selection {
    /// Returns `None` when the label does not belong to the category.
    pub fn new(category: Category, label: &str) -> Option<Self> {
        category
            .labels()
            .iter()
            .find(|l| **l == label)
            .map(|l| Self { category, label: (*l).to_string() })
    }

    /// Builds a selection from the opaque parameters passed between screens.
    /// Missing or unrecognised values mean "no selection".
    pub fn from_params(category: Option<&str>, label: Option<&str>) -> Option<Self> {
        let category = Category::parse(category?)?;
        Self::new(category, label?.trim())
    }

    pub fn category(&self) -> Category {
        self.category
    }

    pub fn label(&self) -> &str {
        &self.label
    }
}

impl fmt::Display for Selection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}", self.category, self.label)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn every_category_offers_four_labels() {
        for category in Category::ALL {
            assert_eq!(category.labels().len(), 4);
        }
    }

    #[test]
    fn params_accept_key_or_directory_name() {
        let by_key = Selection::from_params(Some("normal"), Some("정상 가속")).unwrap();
        let by_dir = Selection::from_params(Some("정상"), Some("정상 가속")).unwrap();
        assert_eq!(by_key, by_dir);
        assert_eq!(by_key.category(), Category::Normal);
    }

    #[test]
    fn missing_params_mean_no_selection() {
        assert!(Selection::from_params(None, Some("급가속")).is_none());
        assert!(Selection::from_params(Some("abnormal"), None).is_none());
        assert!(Selection::from_params(Some("abnormal"), Some("")).is_none());
    }

    #[test]
    fn label_must_belong_to_category() {
        assert!(Selection::new(Category::Normal, "급가속").is_none());
        assert!(Selection::new(Category::Abnormal, "급가속").is_some());
    }
}
