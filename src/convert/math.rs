//! Purpose: Flat math value types that bind to JSON objects of their components.
//! Exports: `Vector2`, `Vector3`, `Vector4`, `Quaternion`, `Matrix4x4`.
//! Invariants: JSON shape is exactly the public component fields, e.g. `{"x":1.0,"y":2.0}`.
//! Invariants: Matrix components are named `mRC` (row, column) and laid out column-major.

use serde::{Deserialize, Serialize};

#[derive(Clone, Copy, Debug, Default, Deserialize, PartialEq, Serialize)]
pub struct Vector2 {
    pub x: f32,
    pub y: f32,
}

#[derive(Clone, Copy, Debug, Default, Deserialize, PartialEq, Serialize)]
pub struct Vector3 {
    pub x: f32,
    pub y: f32,
    pub z: f32,
}

#[derive(Clone, Copy, Debug, Default, Deserialize, PartialEq, Serialize)]
pub struct Vector4 {
    pub x: f32,
    pub y: f32,
    pub z: f32,
    pub w: f32,
}

#[derive(Clone, Copy, Debug, Default, Deserialize, PartialEq, Serialize)]
pub struct Quaternion {
    pub x: f32,
    pub y: f32,
    pub z: f32,
    pub w: f32,
}

impl Quaternion {
    pub const IDENTITY: Self = Self {
        x: 0.0,
        y: 0.0,
        z: 0.0,
        w: 1.0,
    };
}

#[derive(Clone, Copy, Debug, Default, Deserialize, PartialEq, Serialize)]
pub struct Matrix4x4 {
    pub m00: f32,
    pub m10: f32,
    pub m20: f32,
    pub m30: f32,
    pub m01: f32,
    pub m11: f32,
    pub m21: f32,
    pub m31: f32,
    pub m02: f32,
    pub m12: f32,
    pub m22: f32,
    pub m32: f32,
    pub m03: f32,
    pub m13: f32,
    pub m23: f32,
    pub m33: f32,
}

impl Matrix4x4 {
    pub const IDENTITY: Self = Self::from_columns([
        [1.0, 0.0, 0.0, 0.0],
        [0.0, 1.0, 0.0, 0.0],
        [0.0, 0.0, 1.0, 0.0],
        [0.0, 0.0, 0.0, 1.0],
    ]);

    pub const fn from_columns(c: [[f32; 4]; 4]) -> Self {
        Self {
            m00: c[0][0],
            m10: c[0][1],
            m20: c[0][2],
            m30: c[0][3],
            m01: c[1][0],
            m11: c[1][1],
            m21: c[1][2],
            m31: c[1][3],
            m02: c[2][0],
            m12: c[2][1],
            m22: c[2][2],
            m32: c[2][3],
            m03: c[3][0],
            m13: c[3][1],
            m23: c[3][2],
            m33: c[3][3],
        }
    }
}

impl From<[f32; 2]> for Vector2 {
    fn from([x, y]: [f32; 2]) -> Self {
        Self { x, y }
    }
}

impl From<[f32; 3]> for Vector3 {
    fn from([x, y, z]: [f32; 3]) -> Self {
        Self { x, y, z }
    }
}

impl From<[f32; 4]> for Vector4 {
    fn from([x, y, z, w]: [f32; 4]) -> Self {
        Self { x, y, z, w }
    }
}

#[cfg(test)]
mod tests {
    use super::{Matrix4x4, Quaternion, Vector3};
    use serde_json::json;

    #[test]
    fn vectors_bind_to_flat_objects() {
        let v = Vector3::from([1.0, 2.0, 3.0]);
        assert_eq!(
            serde_json::to_string(&v).unwrap(),
            r#"{"x":1.0,"y":2.0,"z":3.0}"#
        );
        let back: Vector3 = serde_json::from_value(json!({"x": 1, "y": 2, "z": 3})).unwrap();
        assert_eq!(back, v);
    }

    #[test]
    fn matrix_fields_are_column_major() {
        let value = serde_json::to_value(Matrix4x4::IDENTITY).unwrap();
        assert_eq!(value["m00"], json!(1.0));
        assert_eq!(value["m33"], json!(1.0));
        assert_eq!(value["m10"], json!(0.0));
        let keys: Vec<&String> = value.as_object().unwrap().keys().collect();
        assert_eq!(keys.len(), 16);
    }

    #[test]
    fn quaternion_identity_round_trips() {
        let encoded = serde_json::to_string(&Quaternion::IDENTITY).unwrap();
        let decoded: Quaternion = serde_json::from_str(&encoded).unwrap();
        assert_eq!(decoded, Quaternion::IDENTITY);
    }
}
