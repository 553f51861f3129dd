use super::{num_elements, Vol};

use crate::Float;

impl<'de> serde::Deserialize<'de> for Vol {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: serde::Deserializer<'de>,
    {
        const FIELDS: &[&str] = &["shape", "w"];
        enum Field {
            Shape,
            W,
        }

        impl<'de> serde::Deserialize<'de> for Field {
            fn deserialize<D>(deserializer: D) -> Result<Field, D::Error>
            where
                D: serde::de::Deserializer<'de>,
            {
                struct FieldVisitor;

                impl<'de> serde::de::Visitor<'de> for FieldVisitor {
                    type Value = Field;

                    fn expecting(&self, formatter: &mut std::fmt::Formatter) -> std::fmt::Result {
                        formatter.write_str("`shape` or `w`")
                    }

                    fn visit_str<E>(self, value: &str) -> Result<Field, E>
                    where
                        E: serde::de::Error,
                    {
                        match value {
                            "shape" => Ok(Field::Shape),
                            "w" => Ok(Field::W),
                            _ => Err(serde::de::Error::unknown_field(value, FIELDS)),
                        }
                    }
                }

                deserializer.deserialize_identifier(FieldVisitor)
            }
        }

        // the buffer must match the shape, otherwise indexing would go out of bounds
        fn checked<E: serde::de::Error>(shape: Vec<usize>, w: Vec<Float>) -> Result<Vol, E> {
            let expected = num_elements(&shape);
            if expected != w.len() {
                return Err(E::custom(format!(
                    "shape holds {expected} elements but `w` has {}",
                    w.len()
                )));
            }
            Ok(Vol { shape, w })
        }

        struct VolVisitor;

        impl<'de> serde::de::Visitor<'de> for VolVisitor {
            type Value = Vol;

            fn expecting(&self, formatter: &mut std::fmt::Formatter) -> std::fmt::Result {
                formatter.write_str("struct Vol")
            }

            fn visit_seq<V>(self, mut seq: V) -> Result<Vol, V::Error>
            where
                V: serde::de::SeqAccess<'de>,
            {
                let shape = seq
                    .next_element()?
                    .ok_or_else(|| serde::de::Error::invalid_length(0, &self))?;
                let w = seq
                    .next_element()?
                    .ok_or_else(|| serde::de::Error::invalid_length(1, &self))?;
                checked(shape, w)
            }

            fn visit_map<V>(self, mut map: V) -> Result<Vol, V::Error>
            where
                V: serde::de::MapAccess<'de>,
            {
                let mut shape = None;
                let mut w = None;
                while let Some(key) = map.next_key()? {
                    match key {
                        Field::Shape => {
                            if shape.is_some() {
                                return Err(serde::de::Error::duplicate_field("shape"));
                            }
                            shape = Some(map.next_value()?);
                        }
                        Field::W => {
                            if w.is_some() {
                                return Err(serde::de::Error::duplicate_field("w"));
                            }
                            w = Some(map.next_value()?);
                        }
                    }
                }
                let shape = shape.ok_or_else(|| serde::de::Error::missing_field("shape"))?;
                let w = w.ok_or_else(|| serde::de::Error::missing_field("w"))?;
                checked(shape, w)
            }
        }

        deserializer.deserialize_struct("Vol", FIELDS, VolVisitor)
    }
}
