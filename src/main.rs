use std::f64::consts::TAU;

use anyhow::Context;
use clap::Parser;

use plate_phase::data::array::DataArray;
use plate_phase::data::container::{DataContainer, DataContainerArray};
use plate_phase::error::Messenger;
use plate_phase::geometry::create::{CreateGeometry, GeometrySelection};
use plate_phase::orientation::math::{om2eu, qu2om, QuatArray};
use plate_phase::orientation::symmetry::CrystalStructure;
use plate_phase::random::{make_rng, UniformSource};
use plate_phase::transformation::attributes::PhaseType;
use plate_phase::transformation::insert::InsertTransformationPhases;
use plate_phase::transformation::microstructure::{
	empty_ensemble_table, empty_feature_table, Microstructure, MicrostructureLocation,
};
use plate_phase::transformation::settings::ArrayNames;
use plate_phase::voxel_grid::info;

mod cli;

/// Uniformly distributed orientation, scalar part non-negative.
fn random_quat<R: UniformSource>(rng: &mut R) -> QuatArray {
	let u1 = rng.next_uniform();
	let u2 = rng.next_uniform();
	let u3 = rng.next_uniform();
	let a = (1.0 - u1).sqrt();
	let b = u1.sqrt();
	let q = [
		(a * (TAU * u2).sin()) as f32,
		(a * (TAU * u2).cos()) as f32,
		(b * (TAU * u3).sin()) as f32,
		(b * (TAU * u3).cos()) as f32,
	];
	if q[3] < 0.0 { q.map(|v| -v) } else { q }
}

/// Cubic grains on a regular lattice, every one in phase 1.
fn build_polycrystal<R: UniformSource>(
	dca: &mut DataContainerArray,
	at: &MicrostructureLocation,
	names: &ArrayNames,
	args: &cli::Cli,
	rng: &mut R,
) -> anyhow::Result<usize> {
	let [nx, ny, nz] = args.dimensions;
	let grains = args.grains.max(1);
	let num_features = grains * grains * grains + 1;

	dca.add_container(DataContainer::new(at.container.clone()));
	let create = CreateGeometry::new(
		at.container.clone(),
		GeometrySelection::Image {
			dimensions: [nx as i64, ny as i64, nz as i64],
			origin: [0.0; 3],
			resolution: args.resolution,
			cell_matrix: at.cell_matrix.clone(),
		},
	);
	let mut msgs = Messenger::new(CreateGeometry::HUMAN_LABEL);
	create.execute(dca, &mut msgs).context("creating the image geometry")?;

	let block = |n: usize, i: usize| (i * grains / n.max(1)).min(grains - 1);
	let mut ids = Vec::with_capacity(nx * ny * nz);
	for k in 0..nz {
		for j in 0..ny {
			for i in 0..nx {
				let id = 1 + block(nx, i) + block(ny, j) * grains + block(nz, k) * grains * grains;
				ids.push(id as i32);
			}
		}
	}

	let mut features = empty_feature_table(&at.feature_matrix, num_features, names)?;
	let phases = features.require(&names.phases)?;
	let quats = features.require(&names.avg_quats)?;
	let eulers = features.require(&names.euler_angles)?;
	for f in 1..num_features {
		let q = random_quat(rng);
		features.set_tuple(phases, f, &[1_i32])?;
		features.set_tuple(quats, f, &q)?;
		features.set_tuple(eulers, f, &om2eu(&qu2om(&q)))?;
	}

	let mut ensembles = empty_ensemble_table(&at.stats_ensemble_matrix, 2, names)?;
	let structures = ensembles.require(&names.crystal_structures)?;
	let phase_types = ensembles.require(&names.phase_types)?;
	let shape_types = ensembles.require(&names.shape_types)?;
	ensembles.set_tuple(structures, 1, &[CrystalStructure::CubicHigh.as_u32()])?;
	ensembles.set_tuple(phase_types, 1, &[PhaseType::Primary as u32])?;
	ensembles.set_tuple(shape_types, 1, &[0_u32])?;

	let dc = dca.container_mut(&at.container)?;
	dc.matrix_mut(&at.cell_matrix)?
		.add_array(DataArray::from_vec(names.feature_ids.clone(), 1, ids)?)?;
	dc.add_matrix(features);
	dc.add_matrix(ensembles);
	Ok(num_features)
}

fn main() -> anyhow::Result<()> {
	let args = cli::Cli::parse();
	cli::initialize_tracing(&args.log_filter, args.log_format);

	info::print_citation();
	info::print_compile_info();

	let settings = args.insertion_settings()?;
	let names = ArrayNames::default();
	let at = MicrostructureLocation::default();
	let mut rng = make_rng(args.seed);

	let mut dca = DataContainerArray::new();
	let original_features = build_polycrystal(&mut dca, &at, &names, &args, &mut rng).context("building the polycrystal")?;
	tracing::info!(features = original_features - 1, "built blocky polycrystal");

	let mut ms = Microstructure::take_from(&mut dca, &at, &names)?;
	ms.grid.report_memory();
	ms.recompute_feature_geometry(&names)?;

	let filter = InsertTransformationPhases {
		settings,
		names: names.clone(),
		progress: args.progress,
	};
	let mut msgs = Messenger::new(InsertTransformationPhases::HUMAN_LABEL);
	let summary = filter
		.execute(&mut ms, &mut rng, &mut msgs)
		.context("inserting transformation phases")?;

	if args.recompute {
		ms.recompute_feature_geometry(&names)?;
	}

	let plate_voxels: usize = ms
		.grid
		.count_voxels_per_feature(ms.num_features())
		.iter()
		.skip(original_features)
		.sum();
	let total_features = ms.num_features();
	ms.return_to(&mut dca, &at, &names)?;

	println!("Grains visited:      {}", summary.visited);
	println!("Too small:           {}", summary.skipped_too_small);
	println!("Plates attempted:    {}", summary.attempted);
	println!("Plates placed:       {}", summary.placed);
	println!("Peninsulas:          {}", summary.peninsulas);
	println!("Overlap aborts:      {}", summary.overlap_aborts);
	println!("New phase index:     {}", summary.new_phase);
	println!("Features now:        {}", total_features - 1);
	println!("Plate voxels:        {}", plate_voxels);
	for m in msgs.warnings() {
		println!("{:?}", m);
	}
	Ok(())
}
