use serde::Serialize;

#[derive(Debug, Clone, Serialize)]
pub struct Dealership {
    pub id: String,
    pub name: String,
    pub is_active: bool,
    pub created_at: String,
}

#[derive(Debug, Clone, Serialize)]
pub struct User {
    pub id: String,
    pub dealership_id: String,
    pub name: String,
    pub is_active: bool,
}
