use super::config::SegmentationConfig;
use super::distance::DistanceMap;

/// Integer location of a local maximum in a distance map.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Peak {
    pub row: u32,
    pub col: u32,
}

/// Non-maximum suppression over a distance map.
///
/// A pixel is a candidate when it is positive, reaches
/// `peaks_rel_threshold * max`, and equals the maximum of the square window
/// of radius `min_diameter` around it. Pixels closer than `min_diameter` to
/// the image edge are never candidates, so objects cut by the border are not
/// reported. Candidates are taken strongest first (row-major order among
/// equal values); one closer than `min_diameter` to an already accepted peak
/// is dropped. Peaks come back in acceptance order.
pub fn find_peaks(map: &DistanceMap, config: &SegmentationConfig) -> Vec<Peak> {
    let w = map.width() as usize;
    let h = map.height() as usize;
    if w == 0 || h == 0 {
        return Vec::new();
    }

    let max_v = map.max();
    if !(max_v > 0.0) {
        return Vec::new();
    }
    let thr = config.peaks_rel_threshold() * max_v;

    let min_distance = config.min_diameter() as usize;
    let local_max = max_filter(map.as_slice(), w, h, min_distance);

    let inside = |idx: usize| {
        let (row, col) = (idx / w, idx % w);
        row >= min_distance && row + min_distance < h && col >= min_distance && col + min_distance < w
    };

    let mut candidates: Vec<(usize, f32)> = map
        .as_slice()
        .iter()
        .zip(&local_max)
        .enumerate()
        .filter(|&(idx, (&v, &m))| v > 0.0 && v >= thr && v == m && inside(idx))
        .map(|(idx, (&v, _))| (idx, v))
        .collect();

    // stable sort keeps row-major order among equal values
    candidates.sort_by(|a, b| b.1.total_cmp(&a.1));

    let r2 = (min_distance * min_distance) as i64;
    let mut accepted: Vec<Peak> = Vec::new();
    'outer: for (idx, _) in candidates {
        let row = (idx / w) as i64;
        let col = (idx % w) as i64;
        for p in &accepted {
            let dr = row - p.row as i64;
            let dc = col - p.col as i64;
            if dr * dr + dc * dc < r2 {
                continue 'outer;
            }
        }
        accepted.push(Peak {
            row: row as u32,
            col: col as u32,
        });
    }

    accepted
}

/// Maximum over the `(2r + 1) x (2r + 1)` window, clipped at the border.
fn max_filter(data: &[f32], w: usize, h: usize, r: usize) -> Vec<f32> {
    let mut rows = vec![0.0f32; data.len()];
    let mut scratch = RunningMax::new(w.max(h), r);
    for y in 0..h {
        scratch.apply(&data[y * w..(y + 1) * w], &mut rows[y * w..(y + 1) * w]);
    }

    let mut out = vec![0.0f32; data.len()];
    let mut column = vec![0.0f32; h];
    let mut column_max = vec![0.0f32; h];
    for x in 0..w {
        for y in 0..h {
            column[y] = rows[y * w + x];
        }
        scratch.apply(&column, &mut column_max);
        for y in 0..h {
            out[y * w + x] = column_max[y];
        }
    }
    out
}

/// 1-D sliding maximum in three passes per line (van Herk / Gil-Werman),
/// independent of the window radius.
struct RunningMax {
    r: usize,
    padded: Vec<f32>,
    forward: Vec<f32>,
    backward: Vec<f32>,
}

impl RunningMax {
    fn new(max_len: usize, r: usize) -> Self {
        let cap = max_len + 2 * r;
        Self {
            r,
            padded: Vec::with_capacity(cap),
            forward: Vec::with_capacity(cap),
            backward: Vec::with_capacity(cap),
        }
    }

    fn apply(&mut self, line: &[f32], out: &mut [f32]) {
        let r = self.r;
        let k = 2 * r + 1;

        self.padded.clear();
        self.padded.resize(r, f32::NEG_INFINITY);
        self.padded.extend_from_slice(line);
        self.padded.resize(line.len() + 2 * r, f32::NEG_INFINITY);
        let m = self.padded.len();

        // running max from the start of each block of length k
        self.forward.clear();
        for (j, &v) in self.padded.iter().enumerate() {
            let prev = if j % k == 0 { f32::NEG_INFINITY } else { self.forward[j - 1] };
            self.forward.push(prev.max(v));
        }

        // running max towards the end of each block
        self.backward.clear();
        self.backward.resize(m, f32::NEG_INFINITY);
        for j in (0..m).rev() {
            let block_end = j + 1 == m || (j + 1) % k == 0;
            let next = if block_end { f32::NEG_INFINITY } else { self.backward[j + 1] };
            self.backward[j] = next.max(self.padded[j]);
        }

        for (i, o) in out.iter_mut().enumerate().take(line.len()) {
            *o = self.backward[i].max(self.forward[i + k - 1]);
        }
    }
}
