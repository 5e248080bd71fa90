use super::{FileIo, Snapshot};
use crate::base::Field;
use crate::StrError;
use std::fmt::{self, Write};
use std::fs::File;
use std::io::Write as IoWrite;

impl FileIo {
    /// Writes a file with one field at a single time station to perform visualization with ParaView
    ///
    /// The velocity and the saturation are written as point data; the pressure is written as cell data.
    pub fn write_vtu(&self, snapshot: &Snapshot, field: Field) -> Result<(), StrError> {
        if !self.enabled() {
            return Err("FileIo must be enabled first");
        }
        if self.cells.len() < 1 {
            return Err("there are no cells to write");
        }
        let npoint = self.coords.len();
        let ncell = self.cells.len();
        let ok = match field {
            Field::Velocity => snapshot.velocity.len() == npoint,
            Field::Pressure => snapshot.pressure.len() == ncell,
            Field::Saturation => snapshot.saturation.len() == npoint,
        };
        if !ok {
            return Err("the snapshot is incompatible with the mesh");
        }
        let buffer = self.vtu_buffer(snapshot, field).map_err(|_| "cannot format VTU data")?;
        let path = self.path_vtu(field, snapshot.index);
        let mut file = File::create(&path).map_err(|_| "cannot create VTU file")?;
        file.write_all(buffer.as_bytes()).map_err(|_| "cannot write VTU file")?;
        Ok(())
    }

    /// Writes a summary file for all time stations of one field to perform visualization with ParaView
    pub fn write_pvd(&self, field: Field) -> Result<(), StrError> {
        if !self.enabled() {
            return Err("FileIo must be enabled first");
        }
        let buffer = self.pvd_buffer(field).map_err(|_| "cannot format PVD data")?;
        let path = self.path_pvd(field);
        let mut file = File::create(&path).map_err(|_| "cannot create PVD file")?;
        file.write_all(buffer.as_bytes()).map_err(|_| "cannot write PVD file")?;
        Ok(())
    }

    /// Formats the VTU file
    fn vtu_buffer(&self, snapshot: &Snapshot, field: Field) -> Result<String, fmt::Error> {
        let mut buffer = String::new();

        // header
        write!(
            &mut buffer,
            "<?xml version=\"1.0\"?>\n\
             <VTKFile type=\"UnstructuredGrid\" version=\"0.1\" byte_order=\"LittleEndian\">\n\
             <UnstructuredGrid>\n\
             <Piece NumberOfPoints=\"{}\" NumberOfCells=\"{}\">\n",
            self.coords.len(),
            self.cells.len()
        )?;

        // nodes: coordinates
        write!(
            &mut buffer,
            "<Points>\n\
             <DataArray type=\"Float64\" NumberOfComponents=\"3\" format=\"ascii\">\n",
        )?;
        for x in &self.coords {
            write!(&mut buffer, "{:?} {:?} 0.0 ", x[0], x[1])?;
        }
        write!(
            &mut buffer,
            "\n</DataArray>\n\
             </Points>\n"
        )?;

        // elements: connectivity
        write!(
            &mut buffer,
            "<Cells>\n\
             <DataArray type=\"Int32\" Name=\"connectivity\" format=\"ascii\">\n"
        )?;
        for cell in &self.cells {
            write!(&mut buffer, "{} {} {} ", cell[0], cell[1], cell[2])?;
        }

        // elements: offsets
        write!(
            &mut buffer,
            "\n</DataArray>\n\
             <DataArray type=\"Int32\" Name=\"offsets\" format=\"ascii\">\n"
        )?;
        for i in 0..self.cells.len() {
            write!(&mut buffer, "{} ", 3 * (i + 1))?;
        }

        // elements: types
        write!(
            &mut buffer,
            "\n</DataArray>\n\
             <DataArray type=\"UInt8\" Name=\"types\" format=\"ascii\">\n"
        )?;
        for _ in 0..self.cells.len() {
            write!(&mut buffer, "{} ", self.vtk_type)?;
        }
        write!(
            &mut buffer,
            "\n</DataArray>\n\
             </Cells>\n"
        )?;

        // data
        match field {
            Field::Velocity => {
                write!(
                    &mut buffer,
                    "<PointData Vectors=\"velocity\">\n\
                     <DataArray type=\"Float64\" Name=\"velocity\" NumberOfComponents=\"3\" format=\"ascii\">\n"
                )?;
                for u in &snapshot.velocity {
                    write!(&mut buffer, "{:?} {:?} 0.0 ", u[0], u[1])?;
                }
                write!(&mut buffer, "\n</DataArray>\n</PointData>\n")?;
            }
            Field::Pressure => {
                write!(
                    &mut buffer,
                    "<CellData Scalars=\"pressure\">\n\
                     <DataArray type=\"Float64\" Name=\"pressure\" NumberOfComponents=\"1\" format=\"ascii\">\n"
                )?;
                for p in &snapshot.pressure {
                    write!(&mut buffer, "{:?} ", p)?;
                }
                write!(&mut buffer, "\n</DataArray>\n</CellData>\n")?;
            }
            Field::Saturation => {
                write!(
                    &mut buffer,
                    "<PointData Scalars=\"saturation\">\n\
                     <DataArray type=\"Float64\" Name=\"saturation\" NumberOfComponents=\"1\" format=\"ascii\">\n"
                )?;
                for s in &snapshot.saturation {
                    write!(&mut buffer, "{:?} ", s)?;
                }
                write!(&mut buffer, "\n</DataArray>\n</PointData>\n")?;
            }
        }

        // footer
        write!(
            &mut buffer,
            "</Piece>\n\
             </UnstructuredGrid>\n\
             </VTKFile>\n"
        )?;
        Ok(buffer)
    }

    /// Formats the PVD file
    fn pvd_buffer(&self, field: Field) -> Result<String, fmt::Error> {
        let mut buffer = String::new();
        write!(
            &mut buffer,
            "<?xml version=\"1.0\"?>\n\
             <VTKFile type=\"Collection\" version=\"0.1\" byte_order=\"LittleEndian\">\n\
             <Collection>\n"
        )?;
        for (index, t) in self.indices.iter().zip(&self.times) {
            write!(
                &mut buffer,
                "<DataSet timestep=\"{:?}\" file=\"{}\" />\n",
                t,
                self.filename_vtu(field, *index)
            )?;
        }
        write!(&mut buffer, "</Collection>\n</VTKFile>\n")?;
        Ok(buffer)
    }
}

////////////////////////////////////////////////////////////////////////////////////////////////////////////////////////
