// SPDX-License-Identifier: Apache-2.0
// Copyright 2025 itsakeyfut
//
// Licensed under the Apache License, Version 2.0 (the "License");
// you may not use this file except in compliance with the License.
// You may obtain a copy of the License at
//
//     http://www.apache.org/licenses/LICENSE-2.0
//
// Unless required by applicable law or agreed to in writing, software
// distributed under the License is distributed on an "AS IS" BASIS,
// WITHOUT WARRANTIES OR CONDITIONS OF ANY KIND, either express or implied.
// See the License for the specific language governing permissions and
// limitations under the License.

//! Fixed-point matrix math
//!
//! All geometry engine matrices are 4x4 signed 32-bit values with 12
//! fractional bits (1.0 = 4096). Vectors are treated as row vectors, so a
//! vertex is transformed as `v * M`.

use serde::{Deserialize, Serialize};

/// Number of fractional bits in the geometry engine's fixed-point format
pub const FRACTION_BITS: u32 = 12;

/// Fixed-point 1.0
pub const ONE: i32 = 1 << FRACTION_BITS;

/// 4-component fixed-point vector (x, y, z, w)
pub type Vector4 = [i32; 4];

/// 4x4 fixed-point (20.12) matrix
///
/// Stored row-major: `field[row][column]`.
///
/// # Examples
///
/// ```
/// use dsrx::core::gx::Matrix;
///
/// let m = Matrix::identity();
/// assert_eq!(m.field[0][0], 4096);
/// assert_eq!(m.field[0][1], 0);
/// assert_eq!(m, Matrix::default());
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Matrix {
    pub field: [[i32; 4]; 4],
}

impl Matrix {
    /// Construct the identity matrix
    pub const fn identity() -> Self {
        Self {
            field: [
                [ONE, 0, 0, 0],
                [0, ONE, 0, 0],
                [0, 0, ONE, 0],
                [0, 0, 0, ONE],
            ],
        }
    }

    /// Build a matrix from 16 row-major parameter words
    pub fn from_4x4(params: &[u32; 16]) -> Self {
        let mut m = Self::identity();
        for (i, &p) in params.iter().enumerate() {
            m.field[i / 4][i % 4] = p as i32;
        }
        m
    }

    /// Build a matrix from 12 parameter words (4 rows of 3 columns)
    ///
    /// The fourth column keeps its identity values `(0, 0, 0, 1.0)`.
    pub fn from_4x3(params: &[u32; 12]) -> Self {
        let mut m = Self::identity();
        for (i, &p) in params.iter().enumerate() {
            m.field[i / 3][i % 3] = p as i32;
        }
        m
    }

    /// Build a matrix from 9 parameter words (upper-left 3x3 block)
    pub fn from_3x3(params: &[u32; 9]) -> Self {
        let mut m = Self::identity();
        for (i, &p) in params.iter().enumerate() {
            m.field[i / 3][i % 3] = p as i32;
        }
        m
    }

    /// Build a scale matrix (diagonal)
    pub fn scale(params: &[u32; 3]) -> Self {
        let mut m = Self::identity();
        for (i, &p) in params.iter().enumerate() {
            m.field[i][i] = p as i32;
        }
        m
    }

    /// Build a translation matrix (last row)
    pub fn translation(params: &[u32; 3]) -> Self {
        let mut m = Self::identity();
        for (i, &p) in params.iter().enumerate() {
            m.field[3][i] = p as i32;
        }
        m
    }

    /// Read a cell by row-major index (0..16)
    #[inline]
    pub fn cell(&self, index: usize) -> i32 {
        self.field[(index / 4) & 3][index % 4]
    }
}

impl Default for Matrix {
    fn default() -> Self {
        Self::identity()
    }
}

/// Multiply two matrices: `a * b`
///
/// Each dot product is accumulated at 64-bit precision (wrapping on
/// overflow) and shifted right by 12 once at the end, then truncated to
/// 32 bits.
///
/// # Examples
///
/// ```
/// use dsrx::core::gx::{multiply, Matrix};
///
/// let mut a = Matrix::identity();
/// a.field[3][0] = 100 << 12;
/// assert_eq!(multiply(&a, &Matrix::identity()), a);
/// ```
pub fn multiply(a: &Matrix, b: &Matrix) -> Matrix {
    let mut out = Matrix { field: [[0; 4]; 4] };

    for (i, row) in out.field.iter_mut().enumerate() {
        for (j, cell) in row.iter_mut().enumerate() {
            let sum = (0..4)
                .map(|k| a.field[i][k] as i64 * b.field[k][j] as i64)
                .fold(0i64, i64::wrapping_add);
            *cell = (sum >> FRACTION_BITS) as i32;
        }
    }

    out
}

/// Transform a row vector by a matrix: `v * m`
///
/// Output component `j` is the dot product of `v` with column `j` of `m`,
/// accumulated in 64 bits and shifted right by 12.
pub fn multiply_vertex(v: &Vector4, m: &Matrix) -> Vector4 {
    let mut out = [0i32; 4];

    for (j, component) in out.iter_mut().enumerate() {
        let sum = (0..4)
            .map(|i| v[i] as i64 * m.field[i][j] as i64)
            .fold(0i64, i64::wrapping_add);
        *component = (sum >> FRACTION_BITS) as i32;
    }

    out
}

/// Transform a direction by the upper-left 3x3 block of a matrix (w = 0)
pub fn multiply_direction(v: &[i32; 3], m: &Matrix) -> [i32; 3] {
    let mut out = [0i32; 3];

    for (j, component) in out.iter_mut().enumerate() {
        let sum = (0..3)
            .map(|i| v[i] as i64 * m.field[i][j] as i64)
            .fold(0i64, i64::wrapping_add);
        *component = (sum >> FRACTION_BITS) as i32;
    }

    out
}
