//! Unit geodesic sphere drawn as a wireframe around the cluster.

use glam::Vec3;

const ICOSAHEDRON_FACES: [[usize; 3]; 20] = [
    [0, 11, 5],
    [0, 5, 1],
    [0, 1, 7],
    [0, 7, 10],
    [0, 10, 11],
    [1, 5, 9],
    [5, 11, 4],
    [11, 10, 2],
    [10, 7, 6],
    [7, 1, 8],
    [3, 9, 4],
    [3, 4, 2],
    [3, 2, 6],
    [3, 6, 8],
    [3, 8, 9],
    [4, 9, 5],
    [2, 4, 11],
    [6, 2, 10],
    [8, 6, 7],
    [9, 8, 1],
];

fn icosahedron_vertices() -> [Vec3; 12] {
    let t = (1.0 + 5.0f32.sqrt()) / 2.0;
    [
        Vec3::new(-1.0, t, 0.0),
        Vec3::new(1.0, t, 0.0),
        Vec3::new(-1.0, -t, 0.0),
        Vec3::new(1.0, -t, 0.0),
        Vec3::new(0.0, -1.0, t),
        Vec3::new(0.0, 1.0, t),
        Vec3::new(0.0, -1.0, -t),
        Vec3::new(0.0, 1.0, -t),
        Vec3::new(t, 0.0, -1.0),
        Vec3::new(t, 0.0, 1.0),
        Vec3::new(-t, 0.0, -1.0),
        Vec3::new(-t, 0.0, 1.0),
    ]
}

fn same_edge(a: (Vec3, Vec3), b: (Vec3, Vec3)) -> bool {
    const EPS: f32 = 1e-4;
    (a.0.abs_diff_eq(b.0, EPS) && a.1.abs_diff_eq(b.1, EPS))
        || (a.0.abs_diff_eq(b.1, EPS) && a.1.abs_diff_eq(b.0, EPS))
}

/// Line-list vertices of a unit icosphere.
///
/// Every icosahedron edge is split into `detail + 1` segments and the new
/// points are pushed onto the sphere; each unique edge appears once.
pub fn icosphere_edges(detail: u32) -> Vec<Vec3> {
    let base = icosahedron_vertices();
    let cols = detail as usize + 1;
    let mut edges: Vec<(Vec3, Vec3)> = Vec::new();
    let mut push = |a: Vec3, b: Vec3| {
        if !edges.iter().any(|&e| same_edge(e, (a, b))) {
            edges.push((a, b));
        }
    };

    for face in ICOSAHEDRON_FACES {
        let [a, b, c] = face.map(|i| base[i]);
        // rows run from edge ab toward vertex c
        let grid: Vec<Vec<Vec3>> = (0..=cols)
            .map(|i| {
                let row_start = a.lerp(c, i as f32 / cols as f32);
                let row_end = b.lerp(c, i as f32 / cols as f32);
                let n = cols - i;
                (0..=n)
                    .map(|j| {
                        let p = if n == 0 {
                            row_start
                        } else {
                            row_start.lerp(row_end, j as f32 / n as f32)
                        };
                        p.normalize()
                    })
                    .collect()
            })
            .collect();

        for i in 0..cols {
            for j in 0..cols - i {
                let (p, q, r) = (grid[i][j], grid[i][j + 1], grid[i + 1][j]);
                push(p, q);
                push(q, r);
                push(r, p);
            }
        }
    }

    edges.into_iter().flat_map(|(a, b)| [a, b]).collect()
}
