#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ObjectType {
    Blob,
    Tree,
    Commit,
    Tag,
}

impl ObjectType {
    pub fn as_str(&self) -> &'static str {
        match self {
            ObjectType::Blob => "blob",
            ObjectType::Tree => "tree",
            ObjectType::Commit => "commit",
            ObjectType::Tag => "tag",
        }
    }

    /// Parse a type tag, returning `None` for anything outside the four known kinds
    pub fn parse(tag: &[u8]) -> Option<ObjectType> {
        match tag {
            b"blob" => Some(ObjectType::Blob),
            b"tree" => Some(ObjectType::Tree),
            b"commit" => Some(ObjectType::Commit),
            b"tag" => Some(ObjectType::Tag),
            _ => None,
        }
    }
}

impl std::str::FromStr for ObjectType {
    type Err = anyhow::Error;

    fn from_str(value: &str) -> anyhow::Result<Self> {
        ObjectType::parse(value.as_bytes())
            .ok_or_else(|| anyhow::anyhow!("invalid object type '{value}'"))
    }
}

impl std::fmt::Display for ObjectType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}
