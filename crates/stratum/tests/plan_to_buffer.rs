//! Integration test: operator sequence → buffer plan → one host buffer.
//!
//! Lays out a small matmul/relu/cast pipeline, binds it, and checks that
//! every tensor's placement fits inside the single physical buffer.

use stratum::prelude::*;

fn f32(id: u32, dims: &[usize]) -> TensorDesc {
    TensorDesc::new(id, dims, DataType::Float32)
}

/// `y = cast_bf16(clip(relu(x · W)))` with x `[2, 16]`, W `[16, 32]`.
fn pipeline() -> Vec<Operator> {
    let mm = Operator::new(
        0,
        MatMul::default(),
        &[f32(0, &[2, 16]), f32(1, &[16, 32])],
        &[TensorId(2)],
    )
    .unwrap();
    let relu = Operator::new(
        1,
        Unary::new(UnaryKind::Relu),
        &[mm.output().clone()],
        &[TensorId(3)],
    )
    .unwrap();
    let clip = Operator::new(
        2,
        Clip::new(None, Some(6.0)),
        &[relu.output().clone()],
        &[TensorId(4)],
    )
    .unwrap();
    let cast = Operator::new(
        3,
        Cast::new(CastType::F32ToBF16),
        &[clip.output().clone()],
        &[TensorId(5)],
    )
    .unwrap();
    vec![mm, relu, clip, cast]
}

#[test]
fn pipeline_formats_like_its_operators() {
    let ops = pipeline();
    let lines: Vec<String> = ops.iter().map(ToString::to_string).collect();
    assert_eq!(
        lines,
        [
            "Matmul([A,B],A=0,B=1,C=2,mnk=[2,32,16])",
            "Relu[1]([2,32],input=2,output=3)",
            "Clip[2]([2,32],input=3,output=4)",
            "Cast[3](f32->bf16,output=5)",
        ]
    );
}

#[test]
fn pipeline_binds_to_one_buffer_covering_every_tensor() {
    let ops = pipeline();
    let mut planner = Planner::default();
    let plan = BufferPlan::build(&ops, &mut planner).unwrap();
    assert_eq!(plan.len(), 6);
    assert_eq!(plan.placement(TensorId(5)).unwrap().bytes, 2 * 32 * 2);

    let rt = HostRuntime::new();
    let mut arena = Arena::from_planner(&rt, planner);
    let handle = *arena.materialize().unwrap();
    let len = rt.buffer_len(handle).unwrap();

    assert_eq!(len, plan.stats().extent);
    for (id, p) in plan.iter() {
        assert!(p.end() <= len, "tensor {id} ends at {} past {len}", p.end());
    }
}

#[test]
fn intermediates_are_recycled() {
    let ops = pipeline();
    let mut planner = Planner::default();
    let plan = BufferPlan::build(&ops, &mut planner).unwrap();

    // x (128) and W (2048) pinned; each activation is 256 bytes and at
    // most two are live at once.
    assert_eq!(plan.stats().peak, 128 + 2048 + 2 * 256);
    // T4 reuses T2's slot once T2 is released after the relu.
    assert_eq!(plan.offset(TensorId(4)), plan.offset(TensorId(2)));
}

#[test]
fn invalid_pipeline_is_reported_before_planning() {
    let err = Operator::new(
        0,
        MatMul::default(),
        &[f32(0, &[2, 16]), f32(1, &[8, 32])],
        &[TensorId(2)],
    )
    .unwrap_err();
    assert_eq!(err, OpError::InnerDimMismatch { a: 16, b: 8 });
    assert_eq!(err.to_string(), "inner dimensions disagree: A has k=16, B has k=8");
}
