//! Precomputed waveshaping transfer curves.

/*
Curve Synthesis
===============

A waveshaper maps each input sample through a transfer function f(x). For
the curve-based distortion path we don't evaluate f per sample; we sample it
once into a lookup table over x ∈ [-1, 1] and interpolate at render time.

  out
   1 ┤            ____
     │          /
     │        /          f(x) = blend of x and tanh(k·s·x)
   0 ┤------/-------
     │    /
     │  /
  -1 ┤_/
     └──────┬──────── in
    -1      0      1

Shape Parameters
----------------

  amount     How hard the saturator is driven. Raises both the input
             pre-scaling (s) and the tanh steepness (k).

  character  Blend between the linear identity (0.0) and the fully nonlinear
             curve (1.0). Also adds pre-scaling, so "more character" bends
             the curve earlier.

Normalization
-------------

After the table is built it is scaled so its largest absolute value is 0.98.
The shaping stage alone therefore never reaches full scale; headroom is left
for the wet/dry mix and the master gain.

With amount = 0 the table is the plain identity and normalization is skipped.

Immutability
------------

A built table is never modified. When the shape changes the engine builds a
new table and swaps its shared reference; voices already playing keep the
table they were started with.
*/

const HEADROOM: f32 = 0.98;

pub const DEFAULT_TABLE_SIZE: usize = 44_100;

#[derive(Debug, Clone)]
pub struct LookupTable {
    values: Vec<f32>,
}

impl LookupTable {
    /// Build a table of `table_size` entries (at least 2) from the shape
    /// parameters. Both parameters are clamped to [0, 1].
    pub fn build(character: f32, amount: f32, table_size: usize) -> Self {
        let size = table_size.max(2);
        let character = sanitize(character);
        let amount = sanitize(amount);

        let mut values = Vec::with_capacity(size);
        let last = (size - 1) as f32;

        if amount == 0.0 {
            values.extend((0..size).map(|i| index_to_input(i, last)));
            return Self { values };
        }

        let pre_scale = 1.0 + amount * (1.0 + 3.0 * character);
        let steepness = 1.0 + 4.0 * amount * (0.5 + character);

        for i in 0..size {
            let x = index_to_input(i, last);
            let linear = x;
            let nonlinear = (steepness * pre_scale * x).tanh();
            values.push(linear * (1.0 - character) + nonlinear * character);
        }

        let peak = values.iter().fold(0.0f32, |acc, v| acc.max(v.abs()));
        if peak > 0.0 {
            let scale = HEADROOM / peak;
            for v in values.iter_mut() {
                *v *= scale;
            }
        }

        Self { values }
    }

    /// Straight line through the origin; useful as a neutral default.
    pub fn identity(table_size: usize) -> Self {
        Self::build(0.0, 0.0, table_size)
    }

    /// Evaluate the curve at `x`, clamping to [-1, 1] and interpolating
    /// linearly between neighbouring entries.
    #[inline]
    pub fn lookup(&self, x: f32) -> f32 {
        let x = if x.is_nan() { 0.0 } else { x.clamp(-1.0, 1.0) };
        let last = self.values.len() - 1;
        let pos = (x + 1.0) * 0.5 * last as f32;
        let index = (pos as usize).min(last - 1);
        let frac = pos - index as f32;

        let a = self.values[index];
        let b = self.values[index + 1];
        a + (b - a) * frac
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    pub fn values(&self) -> &[f32] {
        &self.values
    }

    /// Largest absolute value in the table.
    pub fn peak(&self) -> f32 {
        self.values.iter().fold(0.0f32, |acc, v| acc.max(v.abs()))
    }
}

#[inline]
fn index_to_input(i: usize, last: f32) -> f32 {
    (i as f32 * 2.0) / last - 1.0
}

fn sanitize(v: f32) -> f32 {
    if v.is_finite() {
        v.clamp(0.0, 1.0)
    } else {
        0.0
    }
}
