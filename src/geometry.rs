use nalgebra::Point2;

use crate::pose::Landmark;

fn point(lm: &Landmark) -> Point2<f32> {
    Point2::new(lm.x, lm.y)
}

/// 頂点 `b` における角度（度）
///
/// `b→a` と `b→c` の方位角の差から求め、180度を超える場合は反対側の角を返す。
/// 戻り値は常に [0, 180]。
pub fn angle_at(a: &Landmark, b: &Landmark, c: &Landmark) -> f32 {
    let radians = f32::atan2(c.y - b.y, c.x - b.x) - f32::atan2(a.y - b.y, a.x - b.x);
    let angle = radians.to_degrees().abs();
    if angle > 180.0 {
        360.0 - angle
    } else {
        angle
    }
}

/// 2点間のユークリッド距離（zは無視）
pub fn distance(p: &Landmark, q: &Landmark) -> f32 {
    nalgebra::distance(&point(p), &point(q))
}

/// 2点の中点（合成ランドマーク）
pub fn midpoint(p: &Landmark, q: &Landmark) -> Landmark {
    let mid = nalgebra::center(&point(p), &point(q));
    Landmark::new(
        mid.x,
        mid.y,
        (p.z + q.z) / 2.0,
        p.visibility.min(q.visibility),
    )
}
