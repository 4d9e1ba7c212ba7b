//! Annotated tag object
//!
//! ```text
//! object <sha>
//! type <blob|tree|commit|tag>
//! tag <name>
//! tagger <name> <email> <timestamp> <timezone>
//!
//! <tag message>
//! ```

use crate::artifacts::objects::headers::Headers;
use crate::artifacts::objects::object::{Object, Packable, Unpackable};
use crate::artifacts::objects::object_id::ObjectId;
use crate::artifacts::objects::object_type::ObjectType;
use crate::artifacts::objects::signature::Signature;
use crate::errors::{Error, Result};
use bytes::Bytes;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Tag {
    headers: Headers,
}

impl Tag {
    pub fn new(
        object: &ObjectId,
        target_type: ObjectType,
        name: impl Into<String>,
        tagger: &Signature,
        message: impl Into<Bytes>,
    ) -> Self {
        let mut headers = Headers::new(message);

        headers.push("object", object.to_string());
        headers.push("type", target_type.as_str());
        let name: String = name.into();
        headers.push("tag", name);
        headers.push("tagger", tagger.to_string());

        Tag { headers }
    }

    /// The tagged object
    pub fn object(&self) -> Result<ObjectId> {
        let object = self
            .headers
            .get_str("object")?
            .ok_or_else(|| Error::malformed("tag without object"))?;

        ObjectId::try_parse(object)
            .map_err(|_| Error::malformed(format!("bad tagged object id '{object}'")))
    }

    pub fn target_type(&self) -> Result<ObjectType> {
        let target_type = self
            .headers
            .get_str("type")?
            .ok_or_else(|| Error::malformed("tag without type"))?;

        ObjectType::parse(target_type.as_bytes())
            .ok_or_else(|| Error::malformed(format!("bad tagged object type '{target_type}'")))
    }

    pub fn name(&self) -> Result<&str> {
        self.headers
            .get_str("tag")?
            .ok_or_else(|| Error::malformed("tag without name"))
    }

    pub fn tagger(&self) -> Result<Signature> {
        let line = self
            .headers
            .get_str("tagger")?
            .ok_or_else(|| Error::malformed("tag without tagger"))?;

        Signature::try_from(line)
    }

    pub fn message(&self) -> &[u8] {
        self.headers.message()
    }
}

impl Packable for Tag {
    fn serialize(&self) -> Result<Bytes> {
        Ok(self.headers.serialize())
    }
}

impl Unpackable for Tag {
    fn deserialize(payload: Bytes) -> Result<Self> {
        Ok(Tag {
            headers: Headers::deserialize(payload)?,
        })
    }
}

impl Object for Tag {
    fn object_type(&self) -> ObjectType {
        ObjectType::Tag
    }

    fn display(&self) -> String {
        String::from_utf8_lossy(&self.headers.serialize()).into_owned()
    }
}
