use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Category {
    pub id: String,
    pub name: String,
    pub order: u32,
}

impl Category {
    pub fn new(id: impl Into<String>, name: impl Into<String>, order: u32) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            order,
        }
    }

    /// The categories the site ships with.
    pub fn defaults() -> Vec<Category> {
        vec![
            Category::new("pyro", "Pyrogravures", 1),
            Category::new("peinture", "Peintures", 2),
            Category::new("collage", "Collages", 3),
            Category::new("gravure", "Gravures", 4),
            Category::new("divers", "Divers", 5),
        ]
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct NewCategory {
    #[serde(default)]
    pub id: String,
    #[serde(default)]
    pub name: String,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct CategoryUpdate {
    pub name: Option<String>,
    pub order: Option<u32>,
}
