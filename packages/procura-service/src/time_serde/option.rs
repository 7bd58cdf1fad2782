//! Optional RFC 3339 timestamps. `None` is written and read as null.

use serde::{Deserialize as _, Deserializer, Serializer};
use time::{OffsetDateTime, format_description::well_known::Rfc3339};

pub fn serialize<S>(value: &Option<OffsetDateTime>, serializer: S) -> Result<S::Ok, S::Error>
where
	S: Serializer,
{
	let Some(at) = value else {
		return serializer.serialize_none();
	};

	super::serialize(at, serializer)
}

pub fn deserialize<'de, D>(deserializer: D) -> Result<Option<OffsetDateTime>, D::Error>
where
	D: Deserializer<'de>,
{
	Option::<String>::deserialize(deserializer)?
		.map(|raw| OffsetDateTime::parse(&raw, &Rfc3339))
		.transpose()
		.map_err(serde::de::Error::custom)
}
